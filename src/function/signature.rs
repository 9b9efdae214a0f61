use std::any::Any;
use std::fmt;

use super::types::SharedType;

#[derive(Debug, Clone)]
pub struct InputParameter {
    name: String,
    ty: SharedType,
}

impl InputParameter {
    pub fn new(name: impl Into<String>, ty: SharedType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &SharedType {
        &self.ty
    }
}

#[derive(Debug, Clone)]
pub struct OutputParameter {
    name: String,
    ty: SharedType,
}

impl OutputParameter {
    pub fn new(name: impl Into<String>, ty: SharedType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &SharedType {
        &self.ty
    }
}

/// Ordered inputs and outputs of a function.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    inputs: Vec<InputParameter>,
    outputs: Vec<OutputParameter>,
}

impl Signature {
    pub fn new(inputs: Vec<InputParameter>, outputs: Vec<OutputParameter>) -> Self {
        Self { inputs, outputs }
    }

    pub fn inputs(&self) -> &[InputParameter] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputParameter] {
        &self.outputs
    }

    /// The `E` extension of every input type, in order. `None` marks a slot
    /// whose type does not carry `E`.
    pub fn input_extensions<E: Any>(&self) -> Vec<Option<&E>> {
        self.inputs.iter().map(|param| param.ty.extension::<E>()).collect()
    }

    pub fn output_extensions<E: Any>(&self) -> Vec<Option<&E>> {
        self.outputs.iter().map(|param| param.ty.extension::<E>()).collect()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.inputs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", param.name, param.ty.name())?;
        }
        write!(f, ") -> (")?;
        for (i, param) in self.outputs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", param.name, param.ty.name())?;
        }
        write!(f, ")")
    }
}
