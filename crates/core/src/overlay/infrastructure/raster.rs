use crate::shared::frame::{Frame, RGB_CHANNELS};

/// Sets one pixel; coordinates outside the frame are ignored.
pub fn put_pixel(frame: &mut Frame, x: i32, y: i32, color: [u8; 3]) {
    let (w, h) = (frame.width() as i32, frame.height() as i32);
    if x < 0 || y < 0 || x >= w || y >= h {
        return;
    }
    let offset = (y as usize * w as usize + x as usize) * RGB_CHANNELS;
    frame.data_mut()[offset..offset + RGB_CHANNELS].copy_from_slice(&color);
}

/// Filled disk clipped to the frame.
pub fn fill_disk(frame: &mut Frame, cx: i32, cy: i32, radius: i32, color: [u8; 3]) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                put_pixel(frame, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Bresenham line, widened by stamping a disk at every step.
pub fn draw_line(
    frame: &mut Frame,
    from: (i32, i32),
    to: (i32, i32),
    thickness: u32,
    color: [u8; 3],
) {
    let half = (thickness / 2) as i32;
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        fill_disk(frame, x, y, half, color);
        if (x, y) == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
