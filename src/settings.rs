/// How the shader picks sub-pixel sample positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum SamplingMode {
    /// Uncorrelated draws from the random pool.
    Random = 0,
    /// Consult the precomputed stratified jitter table.
    MultiJittered = 1,
}

impl SamplingMode {
    pub fn label(self) -> &'static str {
        match self {
            SamplingMode::Random => "Random",
            SamplingMode::MultiJittered => "Multi-jittered",
        }
    }
}

/// Render configuration handed to the application at construction. A
/// surrounding settings layer persists and restores these values through
/// the accessors; nothing in here is global state.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    iteration_limit: u32,
    sample_count: u32,
    sampling_mode: SamplingMode,
    background: [f32; 3],
    transparency_enabled: bool,
    toolbar_visible: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            iteration_limit: 5,
            sample_count: 1,
            sampling_mode: SamplingMode::Random,
            background: [0.0, 0.0, 0.0],
            transparency_enabled: false,
            toolbar_visible: true,
        }
    }
}

impl RenderSettings {
    pub fn iteration_limit(&self) -> u32 {
        self.iteration_limit
    }

    pub fn set_iteration_limit(&mut self, limit: u32) {
        self.iteration_limit = limit.max(1);
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn set_sample_count(&mut self, count: u32) {
        self.sample_count = count.max(1);
    }

    pub fn sampling_mode(&self) -> SamplingMode {
        self.sampling_mode
    }

    pub fn set_sampling_mode(&mut self, mode: SamplingMode) {
        self.sampling_mode = mode;
    }

    pub fn background(&self) -> [f32; 3] {
        self.background
    }

    pub fn set_background(&mut self, rgb: [f32; 3]) {
        self.background = rgb;
    }

    pub fn transparency_enabled(&self) -> bool {
        self.transparency_enabled
    }

    pub fn set_transparency_enabled(&mut self, enabled: bool) {
        self.transparency_enabled = enabled;
    }

    pub fn toolbar_visible(&self) -> bool {
        self.toolbar_visible
    }

    pub fn set_toolbar_visible(&mut self, visible: bool) {
        self.toolbar_visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_clamp_to_at_least_one() {
        let mut settings = RenderSettings::default();
        settings.set_iteration_limit(0);
        settings.set_sample_count(0);
        assert_eq!(settings.iteration_limit(), 1);
        assert_eq!(settings.sample_count(), 1);

        settings.set_sample_count(16);
        assert_eq!(settings.sample_count(), 16);
    }

    #[test]
    fn sampling_modes_map_to_shader_selectors() {
        assert_eq!(SamplingMode::Random as u32, 0);
        assert_eq!(SamplingMode::MultiJittered as u32, 1);
    }

    #[test]
    fn defaults_match_a_fresh_session() {
        let settings = RenderSettings::default();
        assert_eq!(settings.iteration_limit(), 5);
        assert_eq!(settings.sample_count(), 1);
        assert_eq!(settings.sampling_mode(), SamplingMode::Random);
        assert_eq!(settings.background(), [0.0, 0.0, 0.0]);
        assert!(!settings.transparency_enabled());
        assert!(settings.toolbar_visible());
    }
}
