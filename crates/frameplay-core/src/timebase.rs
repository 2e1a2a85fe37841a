// crates/frameplay-core/src/timebase.rs
//
// Rational time base + rescale, the same num/den arithmetic
// velocut-media/src/decode.rs uses in LiveDecoder::ts_to_pts/pts_to_secs,
// generalised to rescale between two arbitrary time bases (source_timebase
// -> microseconds) the way async.c's av_rescale_q_rnd calls do.

/// A rational time base, e.g. 1/25 for 25 fps video.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeBase {
    pub num: i64,
    pub den: i64,
}

impl TimeBase {
    pub const fn new(num: i64, den: i64) -> Self {
        Self { num, den }
    }

    /// The canonical time base frames are normalised to before entering
    /// the frame queue (spec §3).
    pub const MICROSECONDS: TimeBase = TimeBase::new(1, 1_000_000);

    /// Rescale `ts`, expressed in `self`, into `to`'s units.
    ///
    /// Matches `av_rescale_q_rnd`'s rounding behaviour closely enough for
    /// this crate's purposes: round-to-nearest via integer arithmetic on
    /// i128 to avoid overflow on large timestamps times large time bases.
    pub fn rescale(&self, ts: i64, to: TimeBase) -> i64 {
        if self.num == to.num && self.den == to.den {
            return ts;
        }
        let numerator = ts as i128 * self.num as i128 * to.den as i128;
        let denominator = self.den as i128 * to.num as i128;
        if denominator == 0 {
            return ts;
        }
        // Round to nearest, ties away from zero.
        let half = denominator / 2;
        let rounded = if numerator >= 0 {
            (numerator + half) / denominator
        } else {
            (numerator - half) / denominator
        };
        rounded as i64
    }

    /// Rescale `ts` from this time base to microseconds.
    pub fn to_micros(&self, ts: i64) -> i64 {
        self.rescale(ts, TimeBase::MICROSECONDS)
    }
}
