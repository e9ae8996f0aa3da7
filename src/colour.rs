use smart_leds::RGB8;

pub fn set_brightness(brightness: u8, pixel: RGB8) -> RGB8 {
    if brightness == 0 {
        return RGB8::default();
    }
    if brightness == 255 {
        return pixel;
    }
    // Use u16 for the multiplication to avoid overflow before the division.
    let r = ((pixel.r as u16 * brightness as u16) / 255) as u8;
    let g = ((pixel.g as u16 * brightness as u16) / 255) as u8;
    let b = ((pixel.b as u16 * brightness as u16) / 255) as u8;

    RGB8::new(r, g, b)
}

/// Colour of a stem pixel `distance` pixels away from the centre of the pulse. Intensity
/// falls off as `255 / (distance + 1)`.
pub fn pulse_pixel(distance: usize, colour: RGB8) -> RGB8 {
    let intensity = 255 / (distance.min(254) + 1);
    set_brightness(intensity as u8, colour)
}
