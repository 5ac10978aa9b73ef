use bevy::math::Vec2;

pub fn within_radius(point: Vec2, center: Vec2, radius: f32) -> bool { point.distance_squared(center) < radius * radius }

/// Shortest distance from `point` to the segment `a..b`.
pub fn segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Axis-aligned overlap of two square bodies given by centre and edge length.
pub fn aabb_overlap(a: Vec2, a_size: f32, b: Vec2, b_size: f32) -> bool {
    let reach = (a_size + b_size) / 2.0;
    (a.x - b.x).abs() < reach && (a.y - b.y).abs() < reach
}

/// Projects `point` back onto the circle when it lies farther than `max_distance` from `center`.
pub fn clamp_to_circle(point: Vec2, center: Vec2, max_distance: f32) -> Vec2 {
    let offset = point - center;
    if offset.length() > max_distance {
        center + offset.normalize_or_zero() * max_distance
    } else {
        point
    }
}

/// Absolute angle between two directions, in `[0, PI]`.
pub fn angle_between(a: Vec2, b: Vec2) -> f32 {
    if a == Vec2::ZERO || b == Vec2::ZERO {
        return 0.0;
    }
    a.angle_between(b).abs()
}
