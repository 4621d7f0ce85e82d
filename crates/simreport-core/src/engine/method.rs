use crate::core::catalog::codes::{AttributeSpec, CLASSICAL_GROUP, QUANTUM_GROUP};
use std::fmt;

pub const DEFAULT_METHOD_HEADER: &str = "Computational method";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComputationalMethod {
    MolecularMechanics,
    MolecularDynamics,
    LangevinDynamics,
    QuantumMechanics,
    SemiEmpirical,
    HybridQmMm,
    Unrecognized(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeGroup {
    Classical,
    Quantum,
}

impl AttributeGroup {
    pub fn attributes(&self) -> &'static [AttributeSpec] {
        match self {
            Self::Classical => CLASSICAL_GROUP,
            Self::Quantum => QUANTUM_GROUP,
        }
    }
}

impl ComputationalMethod {
    /// Parses a free-text method name. Matching ignores case, surrounding
    /// whitespace, and the separator used between words.
    pub fn parse(name: &str) -> Self {
        let key: String = name
            .trim()
            .chars()
            .map(|c| match c {
                '-' | '_' => ' ',
                c => c.to_ascii_lowercase(),
            })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        match key.as_str() {
            "mm" | "molecular mechanics" => Self::MolecularMechanics,
            "md" | "molecular dynamics" => Self::MolecularDynamics,
            "ld" | "langevin dynamics" => Self::LangevinDynamics,
            "qm" | "quantum mechanics" => Self::QuantumMechanics,
            "se" | "semi empirical" | "semiempirical" => Self::SemiEmpirical,
            "qm/mm" | "qmmm" | "hybrid qm/mm" => Self::HybridQmMm,
            _ => Self::Unrecognized(name.trim().to_string()),
        }
    }

    /// Attribute groups rendered for this method, classical before quantum.
    pub fn groups(&self) -> &'static [AttributeGroup] {
        match self {
            Self::MolecularMechanics | Self::MolecularDynamics | Self::LangevinDynamics => {
                &[AttributeGroup::Classical]
            }
            Self::QuantumMechanics | Self::SemiEmpirical => &[AttributeGroup::Quantum],
            Self::HybridQmMm => &[AttributeGroup::Classical, AttributeGroup::Quantum],
            Self::Unrecognized(_) => &[],
        }
    }
}

impl fmt::Display for ComputationalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MolecularMechanics => "Molecular mechanics",
            Self::MolecularDynamics => "Molecular dynamics",
            Self::LangevinDynamics => "Langevin dynamics",
            Self::QuantumMechanics => "Quantum mechanics",
            Self::SemiEmpirical => "Semi-empirical",
            Self::HybridQmMm => "QM/MM",
            Self::Unrecognized(name) => name,
        };
        f.write_str(name)
    }
}

/// What the method section of a report shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSections {
    pub header: String,
    pub method: ComputationalMethod,
    pub groups: &'static [AttributeGroup],
}

impl MethodSections {
    pub fn select(method_name: Option<&str>) -> Self {
        let name = method_name.map(str::trim).filter(|n| !n.is_empty());
        let method = name
            .map(ComputationalMethod::parse)
            .unwrap_or_else(|| ComputationalMethod::Unrecognized(String::new()));
        Self {
            header: name.unwrap_or(DEFAULT_METHOD_HEADER).to_string(),
            groups: method.groups(),
            method,
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = &'static AttributeSpec> {
        self.groups.iter().flat_map(|g| g.attributes().iter())
    }
}
