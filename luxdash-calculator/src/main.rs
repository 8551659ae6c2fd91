use std::env;
use std::error::Error;

use luxdash_calculator::{calculate_from_json, CompensationCurve};

fn main() -> Result<(), Box<dyn Error>> {
    let payload = env::args()
        .nth(1)
        .ok_or("usage: luxdash-calculator '{\"targetIlluminance\": <lux>}'")?;

    let levels = calculate_from_json(&CompensationCurve::default(), &payload)?;

    println!("{}", serde_json::to_string(&levels)?);

    Ok(())
}
