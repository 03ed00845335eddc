use anyhow::{bail, Result};

use scrollto_core::Easing;

const BAR_WIDTH: f64 = 50.0;

/// Print the eased value at `steps + 1` evenly spaced points
pub fn run(easing: Easing, steps: usize) -> Result<()> {
    if steps == 0 {
        bail!("--steps must be at least 1");
    }

    println!("{} over {} steps:\n", easing, steps);

    for step in 0..=steps {
        let t = step as f64 / steps as f64;
        let value = easing.apply(t);
        // Elastic overshoot can push the bar past full width
        let bar = "#".repeat((value.max(0.0) * BAR_WIDTH).round() as usize);
        println!("  {:>5.3}  {:>7.4}  {}", t, value, bar);
    }

    Ok(())
}
