use station_core::{
    render::render_to_string, CarId, Console, ErrorKind, Outcome, Station, StationError,
    StationSnapshot,
};

type TestResult = Result<(), StationError>;

#[test]
fn fresh_stations_are_empty_and_close_cleanly() -> TestResult {
    for platforms in 1..=6 {
        let station = Station::open(platforms)?;
        assert!(station.platforms().iter().all(|p| !p.is_occupied()));
        assert_eq!(station.close(), 0);
    }
    Ok(())
}

#[test]
fn closing_releases_every_car_ever_appended() -> TestResult {
    let mut station = Station::open(3)?;
    for platform in 0..3 {
        station.arrive(platform, 500)?;
        for weight in 0..10 {
            station.append_car(platform, weight * 3)?;
        }
    }
    station.remove_cars(1, 9)?;
    station.move_cars(0, 2, 4, 2, 10)?;
    assert_eq!(station.yard().live(), 29);
    assert_eq!(station.close(), 29);
    Ok(())
}

#[test]
fn arrival_on_occupied_platform_changes_nothing() -> TestResult {
    let mut station = Station::open(1)?;
    station.arrive(0, 70)?;
    station.append_car(0, 20)?;
    let before = StationSnapshot::capture(&station);
    assert_eq!(
        station.arrive(0, 5).unwrap_err().kind(),
        ErrorKind::PreconditionNotMet
    );
    assert_eq!(StationSnapshot::capture(&station), before);

    station.depart(0)?;
    assert!(!station.platform(0)?.is_occupied());
    Ok(())
}

#[test]
fn render_lists_cars_in_append_order() -> TestResult {
    let mut station = Station::open(2)?;
    station.arrive(1, 300)?;
    let weights = [12, 7, 33, 7, 1];
    for weight in weights {
        station.append_car(1, weight)?;
    }
    let text = render_to_string(&station);
    let line = text.lines().nth(1).expect("platform line");
    assert_eq!(line, "1: (300)-|12|-|7|-|33|-|7|-|1|");
    assert_eq!(line.matches("-|").count(), weights.len());
    assert_eq!(text.lines().next(), Some("0: "));
    Ok(())
}

#[test]
fn moves_conserve_cars_and_rejections_change_nothing() -> TestResult {
    let mut station = Station::open(2)?;
    station.arrive(0, 100)?;
    station.arrive(1, 100)?;
    for weight in [1, 2, 3, 4, 5, 6] {
        station.append_car(0, weight)?;
    }
    for weight in [10, 20] {
        station.append_car(1, weight)?;
    }
    let run: Vec<CarId> = station
        .yard()
        .cars(station.train(0)?.head())
        .skip(2)
        .take(3)
        .collect();

    station.move_cars(0, 3, 3, 1, 2)?;
    assert_eq!(station.car_weights(0)?, vec![1, 2, 6]);
    assert_eq!(station.car_weights(1)?, vec![10, 20, 3, 4, 5]);
    let moved: Vec<CarId> = station
        .yard()
        .cars(station.train(1)?.head())
        .skip(2)
        .collect();
    assert_eq!(moved, run, "cars are relinked, not copied");

    let before = StationSnapshot::capture(&station);
    for (pos_a, count, pos_b) in [(0, 1, 1), (4, 1, 1), (2, 5, 1), (1, 1, 6), (1, 0, 1)] {
        assert!(station.move_cars(0, pos_a, count, 1, pos_b).is_err());
    }
    assert!(station.move_cars(7, 1, 1, 1, 1).is_err());
    assert_eq!(StationSnapshot::capture(&station), before);
    assert_eq!(before.car_count(), 8);
    Ok(())
}

#[test]
fn overload_search_and_repair_scenario() -> TestResult {
    let mut station = Station::open(2)?;
    station.arrive(0, 100)?;
    for weight in [30, 40, 50] {
        station.append_car(0, weight)?;
    }
    assert_eq!(station.find_overloaded_train(), Some(0));

    let repair = station.fix_overload()?;
    assert_eq!(repair.weight, 30);
    assert_eq!(station.car_weights(0)?, vec![40, 50]);
    assert_eq!(station.find_overloaded_train(), None);
    assert!(matches!(
        station.fix_overload(),
        Err(StationError::NothingToDo(_))
    ));
    Ok(())
}

#[test]
fn sort_scenario_keeps_equal_cars_in_order() -> TestResult {
    let mut station = Station::open(1)?;
    station.arrive(0, 10)?;
    let first = station.append_car(0, 5)?;
    station.append_car(0, 3)?;
    let second = station.append_car(0, 5)?;

    station.sort_descending(0)?;
    assert_eq!(station.car_weights(0)?, vec![5, 5, 3]);
    let order: Vec<CarId> = station
        .yard()
        .cars(station.train(0)?.head())
        .take(2)
        .collect();
    assert_eq!(order, vec![first, second]);
    Ok(())
}

#[test]
fn console_replays_a_driver_session() {
    let mut console = Console::new(64);
    let session = [
        "open 3",
        "arrive 0 100",
        "arrive 2 60",
        "add 0 30",
        "add 0 40",
        "add 2 25",
        "add 2 25",
        "add 2 20",
        "heaviest 2",
        "express",
        "optimal",
        "leave 7",
    ];
    let outcomes: Vec<_> = session
        .iter()
        .map(|line| console.execute_line(line))
        .collect();

    assert_eq!(
        outcomes[8].as_ref().ok().cloned().flatten().map(|o| o.to_string()),
        Some("0 (from car 1, weight 70)".to_string())
    );
    assert_eq!(outcomes[9], Ok(Some(Outcome::Platform(Some(0)))));
    assert_eq!(outcomes[10], Ok(Some(Outcome::Platform(Some(2)))));
    assert!(outcomes[11].is_err());
    assert_eq!(console.journal().failures(), 1);
}

#[test]
fn handles_to_removed_cars_stay_invalid() -> TestResult {
    let mut station = Station::open(1)?;
    station.arrive(0, 100)?;
    for weight in [3, 9, 4] {
        station.append_car(0, weight)?;
    }
    let run = station.find_heaviest_run(1).expect("run");
    assert_eq!(station.yard().weight(run.first_car), Some(9));

    assert_eq!(station.remove_cars(0, 9)?, 1);
    assert!(!station.yard().contains(run.first_car));
    assert_eq!(station.yard().weight(run.first_car), None);

    let appended = station.append_car(0, 77)?;
    assert_ne!(appended, run.first_car);
    assert_eq!(station.yard().weight(run.first_car), None);
    assert_eq!(station.yard().next(run.first_car), None);
    assert_eq!(station.yard().weight(appended), Some(77));

    let departed = station.train(0)?.head();
    station.depart(0)?;
    assert_eq!(station.yard().cars(departed).count(), 0);
    Ok(())
}
