/// Easing curves.
pub mod ease;
/// Time-based tweens and relative-positioned sequences.
pub mod tween;
