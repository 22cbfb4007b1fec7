//! Feed-forward network driver
//!
//! A small fully connected network with logistic activations, randomly
//! initialised from a seed. Stands in for the optimizer's decision
//! function in headless runs; training happens outside this crate.

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{CONTROL_COUNT, SENSOR_COUNT};
use crate::sim::Driver;
use crate::{Controls, Sensors};

/// Default divisor applied to sensor distances before the first layer
pub const DEFAULT_INPUT_SCALE: f32 = 160.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Layer {
    inputs: usize,
    outputs: usize,
    /// Row-major `outputs x inputs`
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl Layer {
    fn random(inputs: usize, outputs: usize, rng: &mut dyn RngCore) -> Self {
        let weights = (0..inputs * outputs)
            .map(|_| rng.random_range(-2.0..2.0))
            .collect();
        let biases = (0..outputs).map(|_| rng.random_range(-1.0..1.0)).collect();
        Self {
            inputs,
            outputs,
            weights,
            biases,
        }
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        (0..self.outputs)
            .map(|o| {
                let row = &self.weights[o * self.inputs..(o + 1) * self.inputs];
                let acc: f32 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                logistic(acc + self.biases[o])
            })
            .collect()
    }
}

fn logistic(value: f32) -> f32 {
    1.0 / (1.0 + (-value).exp())
}

/// Fully connected sensors -> hidden... -> controls network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedForward {
    layers: Vec<Layer>,
    input_scale: f32,
}

impl FeedForward {
    /// Random network with the given hidden layer widths
    pub fn random(hidden: &[usize], rng: &mut dyn RngCore) -> Self {
        let mut widths = Vec::with_capacity(hidden.len() + 2);
        widths.push(SENSOR_COUNT);
        widths.extend(hidden.iter().copied().filter(|&w| w > 0));
        widths.push(CONTROL_COUNT);

        let layers = widths
            .windows(2)
            .map(|w| Layer::random(w[0], w[1], rng))
            .collect();
        Self {
            layers,
            input_scale: DEFAULT_INPUT_SCALE,
        }
    }

    /// Reproducible random network
    pub fn from_seed(seed: u64, hidden: &[usize]) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        Self::random(hidden, &mut rng)
    }

    pub fn with_input_scale(mut self, scale: f32) -> Self {
        self.input_scale = scale;
        self
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Run the network; outputs are in (0, 1)
    pub fn activate(&self, sensors: &Sensors) -> Controls {
        let mut values: Vec<f32> = sensors.iter().map(|d| d / self.input_scale).collect();
        for layer in &self.layers {
            values = layer.forward(&values);
        }

        let mut controls = [0.0; CONTROL_COUNT];
        for (out, v) in controls.iter_mut().zip(values) {
            *out = v;
        }
        controls
    }
}

impl Driver for FeedForward {
    fn decide(&mut self, sensors: &Sensors) -> Controls {
        self.activate(sensors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure() {
        let net = FeedForward::from_seed(7, &[6]);
        assert_eq!(net.depth(), 2);
        assert_eq!(net.layers[0].weights.len(), SENSOR_COUNT * 6);
        assert_eq!(net.layers[1].outputs, CONTROL_COUNT);

        // Zero-width hidden layers are skipped
        assert_eq!(FeedForward::from_seed(7, &[0]).depth(), 1);
    }

    #[test]
    fn test_seeded_networks_repeat() {
        let a = FeedForward::from_seed(42, &[5, 4]);
        let b = FeedForward::from_seed(42, &[5, 4]);
        let c = FeedForward::from_seed(43, &[5, 4]);
        let sensors = [80.0, 120.0, 160.0];
        assert_eq!(a.activate(&sensors), b.activate(&sensors));
        assert_ne!(a.activate(&sensors), c.activate(&sensors));
    }

    #[test]
    fn test_outputs_in_unit_interval() {
        let mut net = FeedForward::from_seed(1, &[8]).with_input_scale(1.0);
        for sensors in [[0.0; 3], [1e4, 0.0, 1e4], [178.9, 178.9, 160.0]] {
            let out = net.decide(&sensors);
            assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }
}
