//! Spring animation for continuous UI values (camera, hover emphasis)
//!
//! Springs have no fixed duration; they converge on a target and can be
//! retargeted at any time from wherever they currently are. Timed,
//! restartable tweens live in [`super::transition`].
//!
//! Call `tick(dt)` once per frame before reading `get()`.

use crate::config::{global_config, SpringConfigYaml};

/// Stiffness / damping pair for a spring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f32,
    /// 1.0 = critically damped
    pub damping: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::from_preset("medium")
    }
}

impl From<SpringConfigYaml> for SpringConfig {
    fn from(yaml: SpringConfigYaml) -> Self {
        Self {
            stiffness: yaml.stiffness,
            damping: yaml.damping,
        }
    }
}

impl SpringConfig {
    /// Preset from `animation.springs` (`fast`, `medium`, `slow`, `snappy`, `camera`)
    pub fn from_preset(name: &str) -> Self {
        global_config().animation.spring(name).into()
    }
}

const POSITION_EPSILON: f32 = 0.0001;
const VELOCITY_EPSILON: f32 = 0.001;

/// Spring-animated scalar
#[derive(Debug, Clone)]
pub struct SpringF32 {
    current: f32,
    target: f32,
    velocity: f32,
    config: SpringConfig,
}

impl SpringF32 {
    pub fn new(initial: f32) -> Self {
        Self::with_config(initial, SpringConfig::default())
    }

    pub fn with_config(initial: f32, config: SpringConfig) -> Self {
        Self {
            current: initial,
            target: initial,
            velocity: 0.0,
            config,
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn get(&self) -> f32 {
        self.current
    }

    /// Jump to a value with no motion
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.velocity = 0.0;
    }

    /// Advance by `dt` seconds (clamped to 0.1 to keep the integration stable)
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        let k = self.config.stiffness;
        let c = self.config.damping * 2.0 * k.sqrt();

        let acceleration = -k * (self.current - self.target) - c * self.velocity;
        self.velocity += acceleration * dt;
        self.current += self.velocity * dt;

        if !self.is_animating() {
            self.current = self.target;
            self.velocity = 0.0;
        }
    }

    pub fn is_animating(&self) -> bool {
        (self.current - self.target).abs() > POSITION_EPSILON
            || self.velocity.abs() > VELOCITY_EPSILON
    }
}

/// Spring-animated 2D point
#[derive(Debug, Clone)]
pub struct SpringVec2 {
    pub x: SpringF32,
    pub y: SpringF32,
}

impl SpringVec2 {
    pub fn with_config(pos: egui::Pos2, config: SpringConfig) -> Self {
        Self {
            x: SpringF32::with_config(pos.x, config),
            y: SpringF32::with_config(pos.y, config),
        }
    }

    pub fn set_target(&mut self, pos: egui::Pos2) {
        self.x.set_target(pos.x);
        self.y.set_target(pos.y);
    }

    pub fn target(&self) -> egui::Pos2 {
        egui::pos2(self.x.target(), self.y.target())
    }

    pub fn get(&self) -> egui::Pos2 {
        egui::pos2(self.x.get(), self.y.get())
    }

    pub fn set_immediate(&mut self, pos: egui::Pos2) {
        self.x.set_immediate(pos.x);
        self.y.set_immediate(pos.y);
    }

    pub fn tick(&mut self, dt: f32) {
        self.x.tick(dt);
        self.y.tick(dt);
    }

    pub fn is_animating(&self) -> bool {
        self.x.is_animating() || self.y.is_animating()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: SpringConfig = SpringConfig {
        stiffness: 300.0,
        damping: 1.0,
    };

    fn run(spring: &mut SpringF32, seconds: f32) {
        let steps = (seconds / 0.016) as usize;
        for _ in 0..steps {
            spring.tick(0.016);
        }
    }

    #[test]
    fn test_spring_converges() {
        let mut spring = SpringF32::with_config(0.0, FAST);
        spring.set_target(10.0);
        assert!(spring.is_animating());
        run(&mut spring, 2.0);
        assert_eq!(spring.get(), 10.0);
        assert!(!spring.is_animating());
    }

    #[test]
    fn test_critically_damped_does_not_overshoot() {
        let mut spring = SpringF32::with_config(0.0, FAST);
        spring.set_target(1.0);
        for _ in 0..200 {
            spring.tick(0.016);
            assert!(spring.get() <= 1.0 + 1e-3);
        }
    }

    #[test]
    fn test_retarget_mid_flight_starts_from_current() {
        let mut spring = SpringF32::with_config(0.0, FAST);
        spring.set_target(10.0);
        run(&mut spring, 0.1);
        let mid = spring.get();
        assert!(mid > 0.0 && mid < 10.0);

        spring.set_target(-5.0);
        spring.tick(0.001);
        assert!((spring.get() - mid).abs() < 0.5);
    }

    #[test]
    fn test_set_immediate() {
        let mut spring = SpringVec2::with_config(egui::pos2(0.0, 0.0), FAST);
        spring.set_immediate(egui::pos2(3.0, 4.0));
        assert_eq!(spring.get(), egui::pos2(3.0, 4.0));
        assert!(!spring.is_animating());
    }

    #[test]
    fn test_large_dt_is_clamped() {
        let mut spring = SpringF32::with_config(0.0, FAST);
        spring.set_target(1.0);
        spring.tick(5.0);
        assert!(spring.get().is_finite());
    }
}
