//! Shared fixtures for integration tests

#![allow(dead_code)]

use imgops_core::prelude::*;

pub use approx::assert_relative_eq;

/// Install a test subscriber honouring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Reports its identity and records what it was bound with
#[derive(Default)]
pub struct Probe<const ID: i64> {
    pub bound: Vec<(String, Value)>,
}

impl<const ID: i64> Op for Probe<ID> {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        self.bound.push((name.to_string(), value));
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        Ok(())
    }

    fn output(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::Int(ID)),
            "bound" => Some(Value::List(self.bound.iter().map(|(_, v)| v.clone()).collect())),
            _ => None,
        }
    }
}

/// `Probe<ID>` under `name` taking one numeric input
pub fn probe<const ID: i64>(name: &str, priority: impl Into<Priority>) -> OpDescriptor {
    OpDescriptor::builder::<Probe<ID>>(name)
        .priority(priority)
        .input("x", TypeDesc::number())
        .output("id", TypeDesc::int())
        .build()
}

/// Accepts only strictly positive inputs
#[derive(Default)]
pub struct Positive {
    x: f64,
}

impl Op for Positive {
    fn set_input(&mut self, name: &str, value: Value) -> Result<()> {
        self.x = value
            .as_float()
            .ok_or_else(|| Error::wrong_value(name, "number", &value))?;
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        Ok(())
    }

    fn output(&self, _name: &str) -> Option<Value> {
        Some(Value::Str("positive".into()))
    }

    fn as_contingent(&self) -> Option<&dyn Contingent> {
        Some(self)
    }
}

impl Contingent for Positive {
    fn conforms(&self) -> bool {
        self.x > 0.0
    }
}

/// Declares two outputs and only ever sets the first
#[derive(Default)]
pub struct HalfSet;

impl Op for HalfSet {
    fn set_input(&mut self, _name: &str, _value: Value) -> Result<()> {
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        Ok(())
    }

    fn output(&self, name: &str) -> Option<Value> {
        (name == "first").then_some(Value::Int(1))
    }
}

/// Rejects every assignment
#[derive(Default)]
pub struct Stubborn;

impl Op for Stubborn {
    fn set_input(&mut self, name: &str, _value: Value) -> Result<()> {
        Err(Error::unknown_param("stubborn", name))
    }

    fn run(&mut self) -> Result<()> {
        Ok(())
    }

    fn output(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// Fails whenever it runs
#[derive(Default)]
pub struct Failing;

impl Op for Failing {
    fn set_input(&mut self, _name: &str, _value: Value) -> Result<()> {
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        Err(Error::InvalidInput("boom".into()))
    }

    fn output(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// Calls `probe` through the injected engine handle
#[derive(Default)]
pub struct Nested {
    ops: Option<OpService>,
    x: Option<Value>,
    result: Option<Value>,
}

impl Op for Nested {
    fn set_input(&mut self, _name: &str, value: Value) -> Result<()> {
        self.x = Some(value);
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let ops = self
            .ops
            .as_ref()
            .ok_or_else(|| Error::InvalidParameter("ops service not injected".into()))?;
        let x = self.x.clone().unwrap_or(Value::Null);
        self.result = Some(ops.run("probe", &[x])?);
        Ok(())
    }

    fn output(&self, _name: &str) -> Option<Value> {
        self.result.clone()
    }

    fn provide(&mut self, service: ServiceHandle) -> Result<()> {
        match service {
            ServiceHandle::Ops(ops) => self.ops = Some(ops),
            other => {
                return Err(Error::InvalidParameter(format!(
                    "unexpected service {:?}",
                    other.kind()
                )))
            }
        }
        Ok(())
    }
}
