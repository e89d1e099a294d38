pub const DEFAULT_DURATION_MS: u32 = 500;
pub const DEFAULT_LOOP_COUNT: u16 = 0;

/// Timing applied uniformly to every frame of a generated animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationParams {
    /// Display time of each frame in milliseconds
    pub duration_ms: u32,
    /// Number of repetitions, 0 = forever
    pub loop_count: u16,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            loop_count: DEFAULT_LOOP_COUNT,
        }
    }
}

/// A form value that could not be turned into an animation parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidParam {
    pub name: &'static str,
    pub value: String,
}

impl AnimationParams {
    /// Build parameters from the raw `duration` and `loop` form fields.
    /// Absent fields take the defaults, a present field must hold an integer.
    pub fn from_form(
        duration: Option<&str>,
        loop_count: Option<&str>,
    ) -> Result<Self, InvalidParam> {
        Ok(Self {
            duration_ms: parse_field("duration", duration, DEFAULT_DURATION_MS)?,
            loop_count: parse_field("loop", loop_count, DEFAULT_LOOP_COUNT)?,
        })
    }

    pub fn is_infinite(&self) -> bool {
        self.loop_count == 0
    }
}

fn parse_field<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<&str>,
    default: T,
) -> Result<T, InvalidParam> {
    let Some(raw) = raw.map(str::trim) else {
        return Ok(default);
    };

    raw.parse::<T>().map_err(|_| InvalidParam {
        name,
        value: raw.to_string(),
    })
}
