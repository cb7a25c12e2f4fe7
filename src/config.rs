/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::error::ConfigError;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub building: BuildingConfig,
    pub elevator: ElevatorConfig,
    pub dispatcher: DispatcherConfig,
    pub simulation: SimulationConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct BuildingConfig {
    pub min_floor: i32,
    pub max_floor: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ElevatorConfig {
    pub initial_floors: Vec<i32>,
    pub door_opening_ticks: u32,
    pub door_open_ticks: u32,
    pub door_closing_ticks: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Extra cost, in floors, for every committed stop a car makes before the caller's floor.
    pub stop_penalty: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_ms: u64,
    pub max_ticks: u64,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        BuildingConfig {
            min_floor: 0,
            max_floor: 10,
        }
    }
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        ElevatorConfig {
            initial_floors: vec![0],
            door_opening_ticks: 1,
            door_open_ticks: 3,
            door_closing_ticks: 1,
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig { stop_penalty: 2 }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            tick_ms: 500,
            max_ticks: 200,
        }
    }
}

impl BuildingConfig {
    pub fn contains(&self, floor: i32) -> bool {
        floor >= self.min_floor && floor <= self.max_floor
    }
}

impl Config {
    /// Rejects settings the fleet cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.building.min_floor > self.building.max_floor {
            return Err(ConfigError::Invalid(format!(
                "min_floor {} is above max_floor {}",
                self.building.min_floor, self.building.max_floor
            )));
        }

        // Every door phase must last at least one tick, otherwise a phase is skipped
        let elevator = &self.elevator;
        if elevator.door_opening_ticks == 0
            || elevator.door_open_ticks == 0
            || elevator.door_closing_ticks == 0
        {
            return Err(ConfigError::Invalid(
                "door phases must last at least one tick".to_string(),
            ));
        }

        if let Some(floor) = elevator
            .initial_floors
            .iter()
            .find(|floor| !self.building.contains(**floor))
        {
            return Err(ConfigError::Invalid(format!(
                "initial floor {} outside building bounds [{}, {}]",
                floor, self.building.min_floor, self.building.max_floor
            )));
        }

        if self.simulation.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be positive".to_string()));
        }

        Ok(())
    }
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let config_str = fs::read_to_string(path)?;
    parse_config(&config_str)
}

pub fn parse_config(config_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(config_str)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [building]
            min_floor = -2
            max_floor = 12

            [elevator]
            initial_floors = [0, 12]
            door_opening_ticks = 2
            door_open_ticks = 4
            door_closing_ticks = 2

            [dispatcher]
            stop_penalty = 3

            [simulation]
            tick_ms = 100
            max_ticks = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.building.min_floor, -2);
        assert_eq!(config.elevator.initial_floors, vec![0, 12]);
        assert_eq!(config.elevator.door_open_ticks, 4);
        assert_eq!(config.dispatcher.stop_penalty, 3);
        assert_eq!(config.simulation.tick_ms, 100);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_config("[dispatcher]\nstop_penalty = 5\n").unwrap();
        assert_eq!(config.building, BuildingConfig::default());
        assert_eq!(config.elevator, ElevatorConfig::default());
        assert_eq!(config.dispatcher.stop_penalty, 5);
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let result = parse_config("[building]\nmin_floor = 5\nmax_floor = 1\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_zero_door_phase() {
        let result = parse_config("[elevator]\ndoor_open_ticks = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_initial_floor_outside_building() {
        let result = parse_config("[elevator]\ninitial_floors = [0, 11]\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("does/not/exist.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
