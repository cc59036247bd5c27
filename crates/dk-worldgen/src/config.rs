use serde::{Deserialize, Serialize};

use dk_simulation::SimConfig;

use crate::error::{GenError, GenResult};

/// Configuration for a [`WorldGenerator`](crate::pipeline::WorldGenerator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    /// Whole-world attempts before giving up.
    pub max_attempts: u32,
    /// Width of the top-level area.
    pub top_width: u32,
    /// Height of the top-level area.
    pub top_height: u32,
    /// Width of a crypt.
    pub crypt_width: u32,
    /// Height of a crypt.
    pub crypt_height: u32,
    /// Width of the gnomish mines.
    pub mines_width: u32,
    /// Height of the gnomish mines.
    pub mines_height: u32,
    /// Imps landed next to the keeper.
    pub support_actors: u32,
    /// Scatter wildlife over the top-level area.
    pub wildlife: bool,
    /// Wildlife creatures scattered when enabled.
    pub wildlife_count: u32,
    /// Random footprint positions tried per territory.
    pub placement_tries: u32,
    /// Configuration of the built orchestrator.
    pub sim: SimConfig,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            top_width: 250,
            top_height: 250,
            crypt_width: 40,
            crypt_height: 40,
            mines_width: 80,
            mines_height: 60,
            support_actors: 4,
            wildlife: true,
            wildlife_count: 24,
            placement_tries: 200,
            sim: SimConfig::default(),
        }
    }
}

impl GenConfig {
    /// Set the attempt budget.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the top-level area size.
    pub fn with_top_size(mut self, width: u32, height: u32) -> Self {
        self.top_width = width;
        self.top_height = height;
        self
    }

    /// Set the number of imps landed with the keeper.
    pub fn with_support_actors(mut self, count: u32) -> Self {
        self.support_actors = count;
        self
    }

    /// Enable or disable wildlife.
    pub fn with_wildlife(mut self, enabled: bool) -> Self {
        self.wildlife = enabled;
        self
    }

    /// Set the footprint placement budget.
    pub fn with_placement_tries(mut self, tries: u32) -> Self {
        self.placement_tries = tries;
        self
    }

    /// Set the orchestrator configuration.
    pub fn with_sim(mut self, sim: SimConfig) -> Self {
        self.sim = sim;
        self
    }

    /// Reject configurations no attempt could succeed with.
    pub fn validate(&self) -> GenResult<()> {
        if self.max_attempts == 0 {
            return Err(GenError::Config("max_attempts must be at least 1".into()));
        }
        let sizes = [
            ("top-level area", self.top_width, self.top_height),
            ("crypt", self.crypt_width, self.crypt_height),
            ("gnomish mines", self.mines_width, self.mines_height),
        ];
        for (name, width, height) in sizes {
            if width == 0 || height == 0 {
                return Err(GenError::Config(format!("{name} has zero size")));
            }
        }
        Ok(())
    }
}

/// Choices the player makes before a world is generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldOptions {
    /// Name of the world.
    pub world_name: String,
    /// Name of the keeper; drawn from the seed when absent.
    pub keeper_name: Option<String>,
    /// Keeper immigrants arrive far more often.
    pub fast_immigration: bool,
    /// Keeper starts with a large stock of every resource.
    pub starting_resources: bool,
}

impl Default for WorldOptions {
    fn default() -> Self {
        Self {
            world_name: "Deepkeep".into(),
            keeper_name: None,
            fast_immigration: false,
            starting_resources: false,
        }
    }
}

impl WorldOptions {
    /// Options for a world called `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            world_name: name.into(),
            ..Self::default()
        }
    }

    /// Fix the keeper's name.
    pub fn with_keeper(mut self, name: impl Into<String>) -> Self {
        self.keeper_name = Some(name.into());
        self
    }

    /// Enable fast immigration.
    pub fn with_fast_immigration(mut self, enabled: bool) -> Self {
        self.fast_immigration = enabled;
        self
    }

    /// Enable the starting resource bonus.
    pub fn with_starting_resources(mut self, enabled: bool) -> Self {
        self.starting_resources = enabled;
        self
    }
}
