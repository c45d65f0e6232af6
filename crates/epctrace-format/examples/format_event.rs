use chrono::{TimeZone, Utc};
use epctrace_core::{Epc, EventAction, EventKind, EventRecord};
use epctrace_format::format_event;

fn main() {
    let mut record = EventRecord::new(
        EventKind::Object,
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 31, 2).unwrap(),
        "+02:00",
        EventAction::Add,
    );
    record.epcs.push(Epc::list("urn:epc:id:sgtin:0614141.107346.2017"));
    record.epcs.push(Epc::quantity(
        "urn:epc:class:lgtin:4012345.012345.998877",
        Some(200.0),
        Some("KGM".to_string()),
    ));
    record.business_step = Some("urn:epcglobal:cbv:bizstep:shipping".to_string());

    match format_event(&record).and_then(|tree| tree.to_xml()) {
        Ok(xml) => {
            println!("{}", xml);
        }
        Err(err) => {
            eprintln!("formatting failed: {}", err);
            std::process::exit(1);
        }
    }
}
