//! Logic nodes: an optional algebraic computation graph between sensors
//! and actuators.
//!
//! Every node consumes a list of scalar inputs and emits one scalar.
//! Boolean nodes treat nonzero as true and emit 0.0/1.0. Variadic nodes
//! accept any arity ≥ 1; unary and binary nodes check their arity.

use std::collections::VecDeque;

use crate::error::{ControlError, ControlResult};

/// A scalar-in, scalar-out computation node.
pub trait LogicNode {
    fn evaluate(&mut self, inputs: &[f64]) -> ControlResult<f64>;
    fn type_name(&self) -> &'static str;
}

fn require_at_least_one(inputs: &[f64]) -> ControlResult<()> {
    if inputs.is_empty() {
        return Err(ControlError::InvalidArg {
            what: "variadic logic node needs at least one input",
        });
    }
    Ok(())
}

fn require_exactly(inputs: &[f64], n: usize, what: &'static str) -> ControlResult<()> {
    if inputs.len() != n {
        return Err(ControlError::InvalidArg { what });
    }
    Ok(())
}

fn truthy(v: f64) -> bool {
    v != 0.0
}

macro_rules! stateless_node {
    ($name:ident, $label:literal, $inputs:ident, $body:expr) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl LogicNode for $name {
            fn evaluate(&mut self, $inputs: &[f64]) -> ControlResult<f64> {
                $body
            }

            fn type_name(&self) -> &'static str {
                $label
            }
        }
    };
}

stateless_node!(AndNode, "And", inputs, {
    require_at_least_one(inputs)?;
    Ok(if inputs.iter().all(|&v| truthy(v)) { 1.0 } else { 0.0 })
});

stateless_node!(OrNode, "Or", inputs, {
    require_at_least_one(inputs)?;
    Ok(if inputs.iter().any(|&v| truthy(v)) { 1.0 } else { 0.0 })
});

stateless_node!(XorNode, "Xor", inputs, {
    require_at_least_one(inputs)?;
    let count = inputs.iter().filter(|&&v| truthy(v)).count();
    Ok(if count % 2 == 1 { 1.0 } else { 0.0 })
});

stateless_node!(NotNode, "Not", inputs, {
    require_exactly(inputs, 1, "Not takes exactly one input")?;
    Ok(if truthy(inputs[0]) { 0.0 } else { 1.0 })
});

stateless_node!(SumNode, "Sum", inputs, {
    require_at_least_one(inputs)?;
    Ok(inputs.iter().sum())
});

stateless_node!(AverageNode, "Average", inputs, {
    require_at_least_one(inputs)?;
    Ok(inputs.iter().sum::<f64>() / inputs.len() as f64)
});

stateless_node!(MinNode, "Min", inputs, {
    require_at_least_one(inputs)?;
    Ok(inputs.iter().copied().fold(f64::INFINITY, f64::min))
});

stateless_node!(MaxNode, "Max", inputs, {
    require_at_least_one(inputs)?;
    Ok(inputs.iter().copied().fold(f64::NEG_INFINITY, f64::max))
});

stateless_node!(ExpNode, "Exp", inputs, {
    require_exactly(inputs, 1, "Exp takes exactly one input")?;
    Ok(inputs[0].exp())
});

stateless_node!(LnNode, "Ln", inputs, {
    require_exactly(inputs, 1, "Ln takes exactly one input")?;
    if inputs[0] <= 0.0 {
        return Err(ControlError::MathDomain {
            what: "Ln of a non-positive argument",
        });
    }
    Ok(inputs[0].ln())
});

stateless_node!(AbsNode, "Abs", inputs, {
    require_exactly(inputs, 1, "Abs takes exactly one input")?;
    Ok(inputs[0].abs())
});

stateless_node!(MultiplyNode, "Multiply", inputs, {
    require_exactly(inputs, 2, "Multiply takes exactly two inputs")?;
    Ok(inputs[0] * inputs[1])
});

stateless_node!(DivideNode, "Divide", inputs, {
    require_exactly(inputs, 2, "Divide takes exactly two inputs")?;
    if inputs[1] == 0.0 {
        return Err(ControlError::MathDomain {
            what: "Divide by zero",
        });
    }
    Ok(inputs[0] / inputs[1])
});

/// Integrates its single input over a configurable time step.
#[derive(Debug, Clone)]
pub struct IntegratorNode {
    time_step: f64,
    value: f64,
}

impl IntegratorNode {
    pub fn new(time_step: f64) -> Self {
        Self {
            time_step,
            value: 0.0,
        }
    }

    pub fn set_time_step(&mut self, dt: f64) {
        self.time_step = dt;
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

impl LogicNode for IntegratorNode {
    fn evaluate(&mut self, inputs: &[f64]) -> ControlResult<f64> {
        require_exactly(inputs, 1, "Integrator takes exactly one input")?;
        self.value += inputs[0] * self.time_step;
        Ok(self.value)
    }

    fn type_name(&self) -> &'static str {
        "Integrator"
    }
}

/// FIFO moving average over the last N samples.
#[derive(Debug, Clone)]
pub struct MovingAverageNode {
    window_size: usize,
    samples: VecDeque<f64>,
}

impl MovingAverageNode {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            samples: VecDeque::new(),
        }
    }

    pub fn add_sample(&mut self, v: f64) -> f64 {
        if self.samples.len() == self.window_size {
            self.samples.pop_front();
        }
        self.samples.push_back(v);
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }
}

impl LogicNode for MovingAverageNode {
    fn evaluate(&mut self, inputs: &[f64]) -> ControlResult<f64> {
        require_exactly(inputs, 1, "MovingAverage takes exactly one input")?;
        Ok(self.add_sample(inputs[0]))
    }

    fn type_name(&self) -> &'static str {
        "MovingAverage"
    }
}
