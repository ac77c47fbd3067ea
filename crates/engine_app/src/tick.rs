//! Fixed-timestep tick loop.
//!
//! Each tick runs the scheduled systems once, in the order they were added.
//! Structural changes a system queues are applied before the next system
//! starts, so later systems in the same tick observe them.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use engine_component::EcsError;
use engine_system::System;

use crate::coordinator::Coordinator;

/// Configuration for the tick loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl TickConfig {
    /// Wall-clock length of one tick.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] unless `tick_rate` is a positive,
    /// finite number whose period fits in a [`Duration`].
    pub fn tick_duration(&self) -> Result<Duration, EcsError> {
        if !self.tick_rate.is_finite() || self.tick_rate <= 0.0 {
            return Err(EcsError::InvalidConfig(format!(
                "tick_rate must be a positive number, got {}",
                self.tick_rate
            )));
        }
        Duration::try_from_secs_f64(1.0 / self.tick_rate).map_err(|_| {
            EcsError::InvalidConfig(format!("tick_rate {} is too small", self.tick_rate))
        })
    }

    /// Check that the configuration describes a runnable loop.
    ///
    /// # Errors
    ///
    /// See [`TickConfig::tick_duration`].
    pub fn validate(&self) -> Result<(), EcsError> {
        self.tick_duration().map(|_| ())
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

type RunFn = fn(&mut Coordinator, f64) -> Result<(), EcsError>;

#[derive(Debug)]
struct Scheduled {
    name: &'static str,
    run: RunFn,
}

/// Drives a [`Coordinator`] at a fixed rate.
#[derive(Debug)]
pub struct TickLoop {
    tick_id: u64,
    config: TickConfig,
    tick_duration: Duration,
    coordinator: Coordinator,
    schedule: Vec<Scheduled>,
}

impl TickLoop {
    /// Wrap `coordinator` in a loop with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if `config` fails
    /// [`TickConfig::validate`].
    pub fn new(config: TickConfig, coordinator: Coordinator) -> Result<Self, EcsError> {
        let tick_duration = config.tick_duration()?;
        Ok(Self {
            tick_id: 0,
            config,
            tick_duration,
            coordinator,
            schedule: Vec::new(),
        })
    }

    /// The configuration the loop was built with.
    #[must_use]
    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    /// Returns the current tick counter.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// The driven coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Mutable access to the driven coordinator, for setup between ticks.
    pub fn coordinator_mut(&mut self) -> &mut Coordinator {
        &mut self.coordinator
    }

    /// Give the coordinator back, dropping the schedule.
    #[must_use]
    pub fn into_coordinator(self) -> Coordinator {
        self.coordinator
    }

    /// Append the registered system `S` to the per-tick schedule.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`] if `S` is not registered with the
    /// coordinator, or [`EcsError::DuplicateRegistration`] if it is already
    /// scheduled.
    pub fn add_system<S: System>(&mut self) -> Result<(), EcsError> {
        self.coordinator.system::<S>()?;
        if self.schedule.iter().any(|s| s.name == S::name()) {
            return Err(EcsError::DuplicateRegistration(format!(
                "schedule entry {}",
                S::name()
            )));
        }
        self.schedule.push(Scheduled {
            name: S::name(),
            run: Coordinator::run_system::<S>,
        });
        info!(system = S::name(), position = self.schedule.len() - 1, "scheduled system");
        Ok(())
    }

    /// Names of the scheduled systems, in run order.
    pub fn schedule(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.schedule.iter().map(|s| s.name)
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Stops at the first failing system and returns its error; systems
    /// after it do not run this tick.
    pub fn tick(&mut self, dt: f64) -> Result<(), EcsError> {
        self.tick_id += 1;

        debug!(
            tick_id = self.tick_id,
            dt,
            systems = self.schedule.len(),
            entities = self.coordinator.entity_count(),
            "tick start"
        );

        for scheduled in &self.schedule {
            if let Err(err) = (scheduled.run)(&mut self.coordinator, dt) {
                warn!(tick_id = self.tick_id, system = scheduled.name, %err, "system failed");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Run the loop for the configured number of ticks, or indefinitely.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`TickLoop::tick`].
    pub fn run(&mut self) -> Result<(), EcsError> {
        let tick_duration = self.tick_duration;
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            self.tick(tick_duration.as_secs_f64())?;

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(ticks = tick_count, "tick loop complete");
                return Ok(());
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use engine_component::{Component, Signature};
    use engine_system::SystemContext;

    use super::*;

    #[derive(Debug)]
    struct Age(u32);

    impl Component for Age {
        fn type_name() -> &'static str {
            "Age"
        }
    }

    #[derive(Debug, Default)]
    struct Aging;

    impl System for Aging {
        fn update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
            for &e in ctx.entities() {
                ctx.get_mut::<Age>(e)?.0 += 1;
            }
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct Reaper;

    impl System for Reaper {
        fn update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
            for &e in ctx.entities() {
                if ctx.get::<Age>(e)?.0 >= 3 {
                    ctx.commands().destroy(e);
                }
            }
            Ok(())
        }
    }

    fn tick_loop(config: TickConfig) -> TickLoop {
        let mut c = Coordinator::new();
        let age = c.register_component::<Age>().unwrap();
        c.register_system(Aging).unwrap();
        c.register_system(Reaper).unwrap();
        c.set_system_signature::<Aging>(Signature::EMPTY.with(age)).unwrap();
        c.set_system_signature::<Reaper>(Signature::EMPTY.with(age)).unwrap();
        let e = c.create_entity().unwrap();
        c.add_component(e, Age(0)).unwrap();
        TickLoop::new(config, c).unwrap()
    }

    #[test]
    fn test_tick_advances_counter() {
        let mut tick_loop = tick_loop(TickConfig::default());
        assert_eq!(tick_loop.tick_id(), 0);
        tick_loop.tick(1.0 / 60.0).unwrap();
        assert_eq!(tick_loop.tick_id(), 1);
        tick_loop.tick(1.0 / 60.0).unwrap();
        assert_eq!(tick_loop.tick_id(), 2);
    }

    #[test]
    fn test_schedule_order_and_deferred_destroy() {
        let mut tick_loop = tick_loop(TickConfig::default());
        tick_loop.add_system::<Aging>().unwrap();
        tick_loop.add_system::<Reaper>().unwrap();
        assert_eq!(tick_loop.schedule().count(), 2);

        for _ in 0..2 {
            tick_loop.tick(0.0).unwrap();
        }
        assert_eq!(tick_loop.coordinator().entity_count(), 1);

        tick_loop.tick(0.0).unwrap();
        assert_eq!(tick_loop.coordinator().entity_count(), 0);
    }

    #[test]
    fn test_add_system_requires_registration() {
        #[derive(Debug)]
        struct Missing;

        impl System for Missing {
            fn update(&mut self, _ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
                Ok(())
            }
        }

        let mut tick_loop = tick_loop(TickConfig::default());
        assert!(matches!(
            tick_loop.add_system::<Missing>(),
            Err(EcsError::SystemNotFound(_))
        ));
        tick_loop.add_system::<Aging>().unwrap();
        assert!(matches!(
            tick_loop.add_system::<Aging>(),
            Err(EcsError::DuplicateRegistration(_))
        ));
    }

    #[test]
    fn test_tick_config_defaults_missing_fields() {
        let config: TickConfig = serde_json::from_str(r#"{ "max_ticks": 3 }"#).unwrap();
        assert_eq!(config.max_ticks, 3);
        assert_eq!(config.tick_rate, 60.0);
    }

    #[test]
    fn test_rejects_non_positive_tick_rate() {
        for tick_rate in [0.0, -30.0, f64::NAN, f64::INFINITY, 1e-320] {
            let config = TickConfig {
                tick_rate,
                max_ticks: 1,
            };
            assert!(
                matches!(config.validate(), Err(EcsError::InvalidConfig(_))),
                "tick_rate {tick_rate} accepted"
            );
            assert!(matches!(
                TickLoop::new(config, Coordinator::new()),
                Err(EcsError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_zero_tick_rate_from_json_is_rejected() {
        let config: TickConfig =
            serde_json::from_str(r#"{ "tick_rate": 0.0, "max_ticks": 1 }"#).unwrap();
        assert!(TickLoop::new(config, Coordinator::new()).is_err());
        assert_eq!(
            TickConfig::default().tick_duration().unwrap(),
            Duration::from_secs_f64(1.0 / 60.0)
        );
    }

    #[test]
    fn test_run_limited_ticks() {
        let config = TickConfig {
            tick_rate: 1000.0,
            max_ticks: 5,
        };
        let mut tick_loop = tick_loop(config);
        tick_loop.add_system::<Aging>().unwrap();
        tick_loop.run().unwrap();
        assert_eq!(tick_loop.tick_id(), 5);
        let c = tick_loop.into_coordinator();
        let e = c.all_entities()[0];
        assert_eq!(c.component::<Age>(e).unwrap().0, 5);
    }
}
