//! Renders `installation.toml` into compile time constants.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

const INSTALLATION_FILE: &str = "installation.toml";

#[derive(Deserialize)]
struct Installation {
    name: String,
    stem: Stem,
}

#[derive(Deserialize)]
struct Stem {
    led_count: usize,
    pulse_width: usize,
    colour: [u8; 3],
}

fn main() {
    println!("cargo:rerun-if-changed={INSTALLATION_FILE}");

    let source = fs::read_to_string(INSTALLATION_FILE)
        .unwrap_or_else(|e| panic!("Unable to read {INSTALLATION_FILE}: {e}"));
    let installation: Installation =
        toml::from_str(&source).unwrap_or_else(|e| panic!("{INSTALLATION_FILE} is malformed: {e}"));

    if installation.stem.led_count == 0 {
        panic!("{INSTALLATION_FILE}: stem.led_count must be at least 1");
    }
    if installation.stem.pulse_width == 0 {
        panic!("{INSTALLATION_FILE}: stem.pulse_width must be at least 1");
    }

    let [r, g, b] = installation.stem.colour;
    let generated = format!(
        "/// Name reported at start up\n\
         pub const INSTALLATION_NAME: &str = {name:?};\n\
         /// Number of pixels on the stem strip\n\
         pub const STEM_LED_COUNT: usize = {count};\n\
         /// Half width of the travelling stem pulse in pixels\n\
         pub const STEM_PULSE_WIDTH: usize = {width};\n\
         /// Colour of the stem pulse at its centre\n\
         pub const STEM_COLOUR: smart_leds::RGB8 = smart_leds::RGB8 {{ r: {r}, g: {g}, b: {b} }};\n",
        name = installation.name,
        count = installation.stem.led_count,
        width = installation.stem.pulse_width,
    );

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is always set for build scripts");
    fs::write(Path::new(&out_dir).join("installation.rs"), generated)
        .expect("Unable to write the generated installation constants");
}
