use anyhow::Result;

use scrollto_core::Easing;

pub fn run() -> Result<()> {
    println!("Easing functions ({}):\n", Easing::ALL.len());

    for easing in Easing::ALL {
        let marker = if easing == Easing::default() {
            " (default)"
        } else {
            ""
        };
        println!("  {}{}", easing, marker);
    }

    Ok(())
}
