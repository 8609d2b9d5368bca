//! One-shot formation transition: every line travels from its scattered
//! spawn position onto the sphere, staggered by index so the weave appears
//! sequentially. Progress is advanced by the frame driver itself; there is
//! no timer or tween object per line.

use crate::globe::StringLine;

/// Fast start, settling tail. Fixes 0 and 1, strictly increasing between.
pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

#[derive(Debug, Clone, Copy)]
pub struct Formation {
    duration: f32,
    stagger: f32,
    complete: bool,
}

impl Formation {
    pub fn new(duration: f32, stagger: f32) -> Self {
        Self {
            duration,
            stagger,
            complete: false,
        }
    }

    /// Clamped linear progress of line `index` at `now` seconds after the
    /// formation began. Line k starts at `k * stagger`, so later-indexed
    /// lines always start strictly later when the stagger is non-zero.
    pub fn raw_progress(&self, index: usize, now: f32) -> f32 {
        ((now - index as f32 * self.stagger) / self.duration).clamp(0.0, 1.0)
    }

    /// Latched once the last-indexed line has finished its transition.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Move every line to its eased position for `now` and report completion.
    /// Completion is defined on the raw clamped ratio of the final line, so
    /// the flag flips exactly at `(len - 1) * stagger + duration`.
    pub fn advance(&mut self, lines: &mut [StringLine], now: f32) -> bool {
        for (index, line) in lines.iter_mut().enumerate() {
            let raw = self.raw_progress(index, now);
            line.apply_progress(ease_out_cubic(raw));
        }
        if !self.complete {
            self.complete = match lines.len().checked_sub(1) {
                Some(last) => self.raw_progress(last, now) >= 1.0,
                // An empty weave has nothing left to form.
                None => true,
            };
        }
        self.complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn test_lines(count: usize) -> Vec<StringLine> {
        (0..count)
            .map(|i| {
                StringLine::new(
                    [Vec3::splat(i as f32), Vec3::splat(-(i as f32))],
                    [Vec3::X * i as f32, Vec3::Y * i as f32],
                    0.5,
                )
            })
            .collect()
    }

    #[test]
    fn ease_fixes_boundaries_and_increases() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        let mut previous = 0.0;
        for step in 1..=100 {
            let eased = ease_out_cubic(step as f32 / 100.0);
            assert!(eased > previous);
            previous = eased;
        }
    }

    #[test]
    fn staggered_lines_start_strictly_later() {
        let formation = Formation::new(3.0, 0.01);
        // At t = 0.005 only line 0 has begun.
        assert!(formation.raw_progress(0, 0.005) > 0.0);
        assert_eq!(formation.raw_progress(1, 0.005), 0.0);
        // Line 10 is always behind line 9.
        for step in 0..400 {
            let now = step as f32 * 0.01;
            assert!(formation.raw_progress(10, now) <= formation.raw_progress(9, now));
        }
    }

    #[test]
    fn completion_matches_last_line_schedule() {
        // 150 lines, duration 3, stagger 0.01: the last line starts at 1.49
        // and finishes at 4.49.
        let mut formation = Formation::new(3.0, 0.01);
        let mut lines = test_lines(150);

        assert!(!formation.advance(&mut lines, 1.49));
        assert_eq!(formation.raw_progress(149, 1.49), 0.0);

        assert!(!formation.advance(&mut lines, 4.4899));
        assert!(!formation.is_complete());

        assert!(formation.advance(&mut lines, 4.4901));
        assert!(formation.is_complete());
    }

    #[test]
    fn completion_latches() {
        let mut formation = Formation::new(1.0, 0.0);
        let mut lines = test_lines(3);
        assert!(formation.advance(&mut lines, 2.0));
        // Time moving backwards (a stale tick) must not unlatch the flag.
        assert!(formation.advance(&mut lines, 0.5));
        assert!(formation.is_complete());
    }

    #[test]
    fn empty_weave_completes_immediately() {
        let mut formation = Formation::new(3.0, 0.01);
        let mut lines = test_lines(0);
        assert!(formation.advance(&mut lines, 0.0));
    }
}
