use dev_utils::baseline_scenario;

fn main() {
    // The baseline scenario: stop 5 to stop 3, arriving by minute 20.
    let (timetable, params) = baseline_scenario();

    let journeys = connection_scan::query(&timetable, &params, None).expect("baseline scenario never produces a fatal error");

    println!("Found {} journeys:", journeys.len());
    for journey in &journeys {
        println!("{journey}");
    }
}
