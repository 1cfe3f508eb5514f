/// Tunables for the simulation core. Defaults match the shipped levels.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Level loaded on startup.
    pub start_level: String,
    /// Level loaded by the jump-to-boss debug key.
    pub boss_level: String,
    /// Boss updates between shots.
    pub boss_fire_cooldown: u32,
    pub boss_health: u32,
    /// Projectile speed in pixels per frame.
    pub boss_fire_speed: f32,
    /// Frames a projectile survives before expiring.
    pub boss_fire_max_age: u32,
    /// Invincibility frames granted by a projectile hit or a teleport.
    pub grace_period_frames: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_level: "Level1-1".to_string(),
            boss_level: "Level1-boss".to_string(),
            boss_fire_cooldown: 10,
            boss_health: 5,
            boss_fire_speed: 6.0,
            boss_fire_max_age: 300,
            grace_period_frames: 60,
        }
    }
}
