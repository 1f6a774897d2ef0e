//! Message text and keyboards.

use bot_dispatch::CallbackData;
use bus_stop_store::{BusStop, NearbyStop};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use datamall_client::{ArrivingBus, BusArrival, Service};
use std::cmp::Ordering;
use telegram_client::{
    InlineKeyboardButton, InlineKeyboardMarkup, InlineQueryResult, InputTextMessageContent,
    ParseMode,
};
use tracing::debug;

/// Callback tag that refreshes an ETA message in place.
pub const ETA_ACTION: &str = "eta";
/// Callback tag that sends a new ETA message.
pub const NEW_ETA_ACTION: &str = "new_eta";
/// Callback tag of the Resend button. Handled like [`NEW_ETA_ACTION`].
pub const RESEND_ACTION: &str = "resend";
/// Callback tag of the demo button sent with `/start`.
pub const ETA_DEMO_ACTION: &str = "eta_demo";
pub const DEMO_BUS_STOP: &str = "96049";

/// Telegram rejects longer `callback_data`.
pub const MAX_CALLBACK_DATA_BYTES: usize = 64;

/// Placeholder shown in inline results until the ETAs are filled in.
pub const FETCHING_ETAS: &str = "Fetching etas...";
pub const NO_ETAS: &str = "No etas found for this bus stop.";

const SGT_OFFSET_SECS: i32 = 8 * 3600;
const UNKNOWN_ETA: &str = "?";
const TABLE_HEADER: [&str; 4] = ["Svc", "Next", " 2nd", " 3rd"];

/// Singapore time. There is no daylight saving.
pub fn sgt() -> FixedOffset {
    FixedOffset::east_opt(SGT_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Bold stop title followed by the road, or just the code for unknown stops.
pub fn header(code: &str, stop: Option<&BusStop>) -> String {
    match stop {
        Some(stop) => format!("*{} ({})*\n{}", stop.description, stop.code, stop.road),
        None => format!("*{}*", code),
    }
}

/// Full ETA message text.
pub fn eta_text(header: &str, body: &str, now: DateTime<Utc>) -> String {
    format!("{}\n{}\n\n_{}_", header, body, last_updated(now))
}

pub fn last_updated(now: DateTime<Utc>) -> String {
    format!(
        "Last updated at {}",
        now.with_timezone(&sgt()).format("%d %b %y %H:%M SGT")
    )
}

pub fn no_etas() -> String {
    format!("\n{}", NO_ETAS)
}

/// Body shown when DataMall returns an error status.
pub fn datamall_down(status: u16) -> String {
    format!(
        "\nOh no! The LTA DataMall API that Bus Eta Bot relies on appears to be down at the \
         moment (it returned HTTP status code {}).",
        status
    )
}

/// ETA table for `arrival`, limited to `services` when that is non-empty.
pub fn eta_summary(arrival: &BusArrival, services: &[String], now: DateTime<Utc>) -> String {
    let mut shown: Vec<&Service> = arrival
        .services
        .iter()
        .filter(|s| services.is_empty() || services.contains(&s.service_no))
        .collect();
    shown.sort_by(|a, b| service_order(&a.service_no, &b.service_no));

    let rows: Vec<[String; 4]> = shown
        .iter()
        .map(|service| {
            let [first, second, third] = service.upcoming();
            [
                service.service_no.clone(),
                eta_cell(first, now),
                eta_cell(second, now),
                eta_cell(third, now),
            ]
        })
        .collect();

    let total = arrival.services.len();
    let noun = if total > 1 { "services" } else { "service" };

    format!(
        "```\n{}```\nShowing {} out of {} {} for this bus stop.",
        eta_table(&rows),
        rows.len(),
        total,
        noun
    )
}

fn eta_cell(bus: &ArrivingBus, now: DateTime<Utc>) -> String {
    bus.minutes_until(&now)
        .map(|minutes| minutes.to_string())
        .unwrap_or_else(|| UNKNOWN_ETA.into())
}

/// Service numbers compare by their numeric part, ignoring one trailing
/// letter, then as strings. Unparseable numbers sort last.
pub fn service_order(a: &str, b: &str) -> Ordering {
    match (service_number(a), service_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn service_number(service_no: &str) -> Option<u32> {
    let digits = match service_no.chars().last() {
        Some(c) if !c.is_ascii_digit() => &service_no[..service_no.len() - c.len_utf8()],
        _ => service_no,
    };
    digits.parse().ok()
}

/// Pipe table with a ruled header. The service column is left aligned and
/// the ETA columns right aligned.
pub fn eta_table(rows: &[[String; 4]]) -> String {
    let header = TABLE_HEADER.map(String::from);
    let all: Vec<&[String; 4]> = std::iter::once(&header).chain(rows.iter()).collect();

    let mut widths = [0usize; 4];
    for row in &all {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(all.len() + 1);
    for (i, row) in all.iter().enumerate() {
        if i == 1 {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
            lines.push(format!("|{}|", rule.join("|")));
        }

        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(pos, (cell, width))| {
                if pos == 0 {
                    format!(" {:<width$} ", cell, width = width)
                } else {
                    format!(" {:>width$} ", cell, width = width)
                }
            })
            .collect();
        lines.push(format!("|{}|", cells.join("|")));
    }

    lines.join("\n")
}

/// Encode callback data for `action` on `bus_stop`.
///
/// The service filter is left out when it would push the data past
/// [`MAX_CALLBACK_DATA_BYTES`], so the button then covers every service.
pub fn callback_data(
    action: &str,
    bus_stop: &str,
    services: &[String],
) -> serde_json::Result<String> {
    let data = CallbackData::new(action, bus_stop)
        .with_services(services.to_vec())
        .encode()?;
    if data.len() <= MAX_CALLBACK_DATA_BYTES || services.is_empty() {
        return Ok(data);
    }

    debug!(bus_stop, services = services.len(), "Dropping service filter from callback data");
    CallbackData::new(action, bus_stop).encode()
}

/// Keyboard for an ETA message. Chat messages also get a Resend button;
/// inline messages can only be refreshed.
pub fn eta_markup(
    bus_stop: &str,
    services: &[String],
    resend: bool,
) -> serde_json::Result<InlineKeyboardMarkup> {
    let mut row = vec![InlineKeyboardButton::callback(
        "Refresh",
        callback_data(ETA_ACTION, bus_stop, services)?,
    )];
    if resend {
        row.push(InlineKeyboardButton::callback(
            "Resend",
            callback_data(RESEND_ACTION, bus_stop, services)?,
        ));
    }

    Ok(InlineKeyboardMarkup::new(vec![row]))
}

/// Button that sends ETAs for [`DEMO_BUS_STOP`].
pub fn demo_button() -> serde_json::Result<InlineKeyboardButton> {
    let data = CallbackData {
        action: ETA_DEMO_ACTION.into(),
        ..Default::default()
    };
    Ok(InlineKeyboardButton::callback(
        format!("Get etas for bus stop {}", DEMO_BUS_STOP),
        data.encode()?,
    ))
}

/// Reply sent when handling an update failed.
pub fn something_went_wrong(update_id: i64) -> String {
    format!("Oh no! Something went wrong.\n\nUpdate ID: {}", update_id)
}

/// Intro line plus one "Get etas" button per stop.
pub fn nearby_text(stops: &[NearbyStop]) -> String {
    let mut text = String::from("Here are some bus stops near your location:\n");
    for nearby in stops {
        text.push_str(&format!(
            "\n*{} ({})*\n{}, {:.0} m away\n",
            nearby.stop.description, nearby.stop.code, nearby.stop.road, nearby.distance
        ));
    }
    text
}

pub fn nearby_markup(stops: &[NearbyStop]) -> serde_json::Result<InlineKeyboardMarkup> {
    let rows = stops
        .iter()
        .map(|nearby| -> serde_json::Result<Vec<InlineKeyboardButton>> {
            let data = callback_data(NEW_ETA_ACTION, &nearby.stop.code, &[])?;
            let label = format!(
                "Get etas for {} ({})",
                nearby.stop.description, nearby.stop.code
            );
            Ok(vec![InlineKeyboardButton::callback(label, data)])
        })
        .collect::<serde_json::Result<Vec<_>>>()?;

    Ok(InlineKeyboardMarkup::new(rows))
}

pub fn no_nearby_stops(radius: f64) -> String {
    format!(
        "Oops, I couldn't find any bus stops within {:.0} m of your location.",
        radius
    )
}

/// Location result for a stop. The sent message says it is fetching ETAs
/// until the chosen-result handler replaces it.
pub fn inline_result(stop: &BusStop) -> serde_json::Result<InlineQueryResult> {
    let title = format!("{} ({})", stop.description, stop.code);

    Ok(InlineQueryResult::Location {
        id: stop.code.clone(),
        title,
        latitude: stop.latitude,
        longitude: stop.longitude,
        reply_markup: Some(eta_markup(&stop.code, &[], false)?),
        input_message_content: Some(InputTextMessageContent {
            message_text: format!("{}\n\n`{}`", header(&stop.code, Some(stop)), FETCHING_ETAS),
            parse_mode: Some(ParseMode::Markdown),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2017-06-05T14:46:27+08:00")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn bus(arrival: &str) -> ArrivingBus {
        ArrivingBus {
            estimated_arrival: DateTime::parse_from_rfc3339(arrival).ok(),
            ..Default::default()
        }
    }

    fn service(no: &str, arrivals: [&str; 3]) -> Service {
        Service {
            service_no: no.into(),
            operator: "SBST".into(),
            next_bus: bus(arrivals[0]),
            next_bus_2: bus(arrivals[1]),
            next_bus_3: bus(arrivals[2]),
        }
    }

    fn arrival() -> BusArrival {
        BusArrival {
            bus_stop_code: "96049".into(),
            services: vec![
                service(
                    "24",
                    [
                        "2017-06-05T14:47:27+08:00",
                        "2017-06-05T14:49:27+08:00",
                        "2017-06-05T14:52:27+08:00",
                    ],
                ),
                service(
                    "2",
                    [
                        "2017-06-05T14:45:27+08:00",
                        "2017-06-05T14:56:27+08:00",
                        "",
                    ],
                ),
            ],
        }
    }

    #[test]
    fn test_eta_table() {
        let rows = vec![
            ["2".to_string(), "-2".into(), "12".into(), "20".into()],
            ["24".to_string(), "2".into(), "9".into(), "18".into()],
        ];
        assert_eq!(
            eta_table(&rows),
            "| Svc | Next |  2nd |  3rd |\n\
             |-----|------|------|------|\n\
             | 2   |   -2 |   12 |   20 |\n\
             | 24  |    2 |    9 |   18 |"
        );
    }

    #[test]
    fn test_eta_table_without_rows() {
        assert_eq!(eta_table(&[]), "| Svc | Next |  2nd |  3rd |");
    }

    #[test]
    fn test_eta_summary_sorts_services() {
        assert_eq!(
            eta_summary(&arrival(), &[], now()),
            "```\n\
             | Svc | Next |  2nd |  3rd |\n\
             |-----|------|------|------|\n\
             | 2   |   -1 |   10 |    ? |\n\
             | 24  |    1 |    3 |    6 |```\n\
             Showing 2 out of 2 services for this bus stop."
        );
    }

    #[test]
    fn test_eta_summary_filters_services() {
        let summary = eta_summary(&arrival(), &["24".to_string()], now());
        assert!(summary.contains("| 24  |    1 |    3 |    6 |"));
        assert!(!summary.contains("| 2   |"));
        assert!(summary.ends_with("Showing 1 out of 2 services for this bus stop."));
    }

    #[test]
    fn test_service_order() {
        let mut services = vec!["10e", "2", "N", "10", "963", "36A", "CT8"];
        services.sort_by(|a, b| service_order(a, b));
        assert_eq!(services, vec!["2", "10", "10e", "36A", "963", "CT8", "N"]);
    }

    #[test]
    fn test_header() {
        let stop = BusStop {
            code: "96049".into(),
            road: "Upp Changi Rd East".into(),
            description: "Opp Tropicana Condo".into(),
            latitude: 1.34,
            longitude: 103.96,
        };
        assert_eq!(
            header("96049", Some(&stop)),
            "*Opp Tropicana Condo (96049)*\nUpp Changi Rd East"
        );
        assert_eq!(header("96049", None), "*96049*");
    }

    #[test]
    fn test_eta_text_has_sgt_timestamp() {
        let text = eta_text("*96049*", &no_etas(), now());
        assert_eq!(
            text,
            "*96049*\n\nNo etas found for this bus stop.\n\n_Last updated at 05 Jun 17 14:46 SGT_"
        );
    }

    #[test]
    fn test_eta_markup_for_chat_message() {
        let markup = eta_markup("96049", &["2".to_string()], true).unwrap();
        let row = &markup.inline_keyboard[0];
        assert_eq!(row.len(), 2);
        assert_eq!(row[0].text, "Refresh");
        assert_eq!(
            row[0].callback_data.as_deref(),
            Some(r#"{"t":"eta","b":"96049","s":["2"]}"#)
        );
        assert_eq!(row[1].text, "Resend");
        assert_eq!(
            row[1].callback_data.as_deref(),
            Some(r#"{"t":"resend","b":"96049","s":["2"]}"#)
        );
    }

    #[test]
    fn test_eta_markup_for_inline_message() {
        let markup = eta_markup("96049", &[], false).unwrap();
        assert_eq!(markup.inline_keyboard, vec![vec![InlineKeyboardButton::callback(
            "Refresh",
            r#"{"t":"eta","b":"96049"}"#
        )]]);
    }

    #[test]
    fn test_callback_data_fits_telegram_limit() {
        let query = crate::query::infer_eta_query("96049 2 24 5 10 12 13 14 15 16").unwrap();

        for action in [ETA_ACTION, RESEND_ACTION, NEW_ETA_ACTION] {
            let data = callback_data(action, &query.bus_stop, &query.services).unwrap();
            assert!(data.len() <= MAX_CALLBACK_DATA_BYTES, "{} is too long", data);
        }
        assert_eq!(
            callback_data(ETA_ACTION, &query.bus_stop, &query.services).unwrap(),
            r#"{"t":"eta","b":"96049"}"#
        );
    }

    #[test]
    fn test_callback_data_keeps_short_service_filter() {
        let services = vec!["2".to_string(), "24".to_string(), "5".to_string()];
        assert_eq!(
            callback_data(RESEND_ACTION, "96049", &services).unwrap(),
            r#"{"t":"resend","b":"96049","s":["2","24","5"]}"#
        );
    }

    #[test]
    fn test_demo_button() {
        let button = demo_button().unwrap();
        assert_eq!(button.text, "Get etas for bus stop 96049");
        assert_eq!(button.callback_data.as_deref(), Some(r#"{"t":"eta_demo"}"#));
    }
}
