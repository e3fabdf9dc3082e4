use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layers::dense::LayerDense;

/// Weight-initialisation parameters for a dense layer.
///
/// Weights are drawn from `N(mean, stddev) * scale`. With `seed` set, the
/// draw is reproducible; without it the generator is seeded from OS entropy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitConfig {
    pub mean: f64,
    pub stddev: f64,
    pub scale: f64,
    pub seed: Option<u64>,
}

impl Default for InitConfig {
    fn default() -> Self {
        InitConfig {
            mean: 0.0,
            stddev: 0.01,
            scale: 1.0,
            seed: None,
        }
    }
}

impl InitConfig {
    /// Default parameters with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        InitConfig {
            seed: Some(seed),
            ..InitConfig::default()
        }
    }

    /// Generator for this config: seeded when `seed` is set, entropy otherwise.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Shape and initialisation of one dense layer.
///
/// Describes how to build a layer, not its trained weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseSpec {
    pub n_inputs: usize,
    pub n_neurons: usize,
    #[serde(default)]
    pub init: InitConfig,
}

impl DenseSpec {
    pub fn new(n_inputs: usize, n_neurons: usize) -> Self {
        DenseSpec {
            n_inputs,
            n_neurons,
            init: InitConfig::default(),
        }
    }

    /// Constructs the layer with a generator derived from `init`.
    pub fn build(&self) -> Result<LayerDense> {
        debug!(
            "building dense layer {}x{} (seeded: {})",
            self.n_inputs,
            self.n_neurons,
            self.init.seed.is_some()
        );
        let mut rng = self.init.rng();
        LayerDense::with_init(self.n_inputs, self.n_neurons, &self.init, &mut rng)
    }

    pub fn from_json_str(json: &str) -> Result<DenseSpec> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `DenseSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<DenseSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
