use image::{Rgb, RgbImage};

/// Draws a hollow rectangle with edges `thickness` pixels wide, centred on
/// the given corners. Anything outside the image is clipped.
pub fn draw_rectangle(image: &mut RgbImage, corners: [i32; 4], color: Rgb<u8>, thickness: u32) {
    let thickness = thickness.clamp(1, i16::MAX as u32) as i32;

    // Corners further out than one edge width never reach the image.
    let max_x = (image.width() as i32).saturating_add(thickness);
    let max_y = (image.height() as i32).saturating_add(thickness);
    let cx = |x: i32| x.clamp(-thickness, max_x);
    let cy = |y: i32| y.clamp(-thickness, max_y);

    let (x1, x2) = (cx(corners[0].min(corners[2])), cx(corners[0].max(corners[2])));
    let (y1, y2) = (cy(corners[1].min(corners[3])), cy(corners[1].max(corners[3])));
    let first = -(thickness / 2);
    let last = first + thickness - 1;

    // Draw horizontal lines
    for dy in first..=last {
        for x in (x1 + first)..=(x2 + last) {
            put_pixel_clipped(image, x, y1 + dy, color);
            put_pixel_clipped(image, x, y2 + dy, color);
        }
    }

    // Draw vertical lines
    for dx in first..=last {
        for y in y1..=y2 {
            put_pixel_clipped(image, x1 + dx, y, color);
            put_pixel_clipped(image, x2 + dx, y, color);
        }
    }
}

pub(crate) fn put_pixel_clipped(image: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x < image.width() && y < image.height() {
        image.put_pixel(x, y, color);
    }
}
