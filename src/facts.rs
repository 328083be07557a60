//! Display facts built from SpaceX rocket metadata, NASA APOD and trivia
//!
//! Facts are rebuilt on every call; only the source clients cache.

use crate::data::{Apod, ApodClient, FactKind, FactSource, RocketFact, SpaceXClient, SpaceXRocket};

/// Curated trivia appended after the fetched facts: (title, value, source)
const TRIVIA: &[(&str, &str, FactSource)] = &[
    (
        "Fastest Rocket",
        "The Saturn V rocket reached speeds of 40,000 km/h during Apollo missions",
        FactSource::Nasa,
    ),
    (
        "Reusable Innovation",
        "SpaceX Falcon 9 first stage has been reused over 20 times",
        FactSource::SpaceX,
    ),
    (
        "Fuel Capacity",
        "The Space Shuttle external tank held 227,000 liters of liquid hydrogen",
        FactSource::Nasa,
    ),
];

/// Generates [`RocketFact`] lists
#[derive(Debug, Clone)]
pub struct FactsGenerator {
    spacex: SpaceXClient,
    apod: ApodClient,
}

impl FactsGenerator {
    pub fn new(spacex: SpaceXClient, apod: ApodClient) -> Self {
        Self { spacex, apod }
    }

    /// Fetches rockets and today's APOD concurrently and builds the fact list
    pub async fn generate(&self) -> Vec<RocketFact> {
        let (rockets, apod) = tokio::join!(self.spacex.fetch_rockets(), self.apod.fetch_today());
        build_facts(&rockets, apod.as_ref())
    }
}

/// Rocket stats in API order, then the APOD, then the fixed trivia
///
/// A stat whose source field is missing is left out rather than shown empty.
pub fn build_facts(rockets: &[SpaceXRocket], apod: Option<&Apod>) -> Vec<RocketFact> {
    let mut facts = Vec::new();

    for (index, rocket) in rockets.iter().enumerate() {
        if let Some((meters, feet)) = rocket.height.and_then(|h| Some((h.meters?, h.feet?))) {
            facts.push(stat(
                format!("rocket-height-{index}"),
                format!("{} Height", rocket.name),
                format!("{meters}m ({feet}ft)"),
            ));
        }

        if let Some(kg) = rocket.mass.and_then(|m| m.kg) {
            facts.push(stat(
                format!("rocket-mass-{index}"),
                format!("{} Mass", rocket.name),
                format!("{}kg", group_thousands(kg)),
            ));
        }

        if let Some(rate) = rocket.success_rate_pct {
            facts.push(stat(
                format!("rocket-success-{index}"),
                format!("{} Success Rate", rocket.name),
                format!("{rate}%"),
            ));
        }

        if let Some(description) = rocket.description.as_deref().filter(|d| !d.trim().is_empty()) {
            facts.push(RocketFact {
                id: format!("rocket-desc-{index}"),
                kind: FactKind::Trivia,
                title: rocket.name.clone(),
                value: description.to_string(),
                source: FactSource::SpaceX,
            });
        }
    }

    if let Some(apod) = apod {
        facts.push(RocketFact {
            id: "apod".to_string(),
            kind: FactKind::Apod,
            title: apod.title.clone(),
            value: apod.explanation.clone(),
            source: FactSource::Nasa,
        });
    }

    facts.extend(
        TRIVIA
            .iter()
            .enumerate()
            .map(|(i, (title, value, source))| RocketFact {
                id: format!("trivia-{}", i + 1),
                kind: FactKind::Trivia,
                title: title.to_string(),
                value: value.to_string(),
                source: *source,
            }),
    );

    facts
}

fn stat(id: String, title: String, value: String) -> RocketFact {
    RocketFact {
        id,
        kind: FactKind::Stat,
        title,
        value,
        source: FactSource::SpaceX,
    }
}

/// Formats a quantity rounded to an integer with comma thousands separators
fn group_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
