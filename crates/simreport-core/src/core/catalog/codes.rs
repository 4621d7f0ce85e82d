//! Attribute codes queried by the report engine and their canonical terms.

use phf::{Map, phf_map};

// --- Molecular system (topology) ---
pub const MOLECULAR_SYSTEM_DESCRIPTION: &str = "MOLECULAR_SYSTEM_DESCRIPTION";
pub const MOLECULE_TYPE: &str = "MOLECULE_TYPE";
pub const MOLECULE_DESCRIPTION: &str = "MOLECULE_DESCRIPTION";
pub const RESIDUE_CHAIN: &str = "RESIDUE_CHAIN";
pub const RESIDUE_CHAIN_NORM: &str = "RESIDUE_CHAIN_NORM";
pub const RESIDUE_NON_STD: &str = "RESIDUE_NON_STD";
pub const CHEMICAL_FORMULA: &str = "CHEMICAL_FORMULA";
pub const MOLECULE_ATOMIC_COMPOSITION: &str = "MOLECULE_ATOMIC_COMPOSITION";
pub const MOLECULE_ATOMIC_WEIGHT: &str = "MOLECULE_ATOMIC_WEIGHT";
pub const COUNT_ATOMS: &str = "COUNT_ATOMS";
pub const COUNT_IONS: &str = "COUNT_IONS";
pub const COUNT_SOLVENT: &str = "COUNT_SOLVENT";
pub const TOTAL_MOLECULE_CHARGE: &str = "TOTAL_MOLECULE_CHARGE";

// --- Computational method ---
pub const COMPUTATIONAL_METHOD_NAME: &str = "COMPUTATIONAL_METHOD_NAME";
pub const BOUNDARY_CONDITIONS: &str = "BOUNDARY_CONDITIONS";
pub const SOLVENT_TYPE: &str = "SOLVENT_TYPE";
pub const IMPLICIT_SOLVENT_MODEL: &str = "IMPLICIT_SOLVENT_MODEL";

pub const FORCE_FIELD: &str = "FORCE_FIELD";
pub const MM_INTEGRATOR: &str = "MM_INTEGRATOR";
pub const ELECTROSTATICS_MODELING: &str = "ELECTROSTATICS_MODELING";
pub const UNIT_SHAPE: &str = "UNIT_SHAPE";
pub const ENSEMBLE_MODELING: &str = "ENSEMBLE_MODELING";
pub const BAROSTAT_ALGORITHM: &str = "BAROSTAT_ALGORITHM";
pub const THERMOSTAT_ALGORITHM: &str = "THERMOSTAT_ALGORITHM";
pub const REFERENCE_TEMPERATURE: &str = "REFERENCE_TEMPERATURE";
pub const REFERENCE_PRESSURE: &str = "REFERENCE_PRESSURE";
pub const CONSTRAINT_ALGORITHM: &str = "CONSTRAINT_ALGORITHM";
pub const RESTRAINT_TYPE: &str = "RESTRAINT_TYPE";
pub const LANGEVIN_COLLISION_FREQUENCY: &str = "LANGEVIN_COLLISION_FREQUENCY";
pub const STOCHASTICS_NOISE_TERM_AMPLITUDE: &str = "STOCHASTICS_NOISE_TERM_AMPLITUDE";
pub const SIMULATED_TIME: &str = "SIMULATED_TIME";
pub const TIME_STEP_LENGTH: &str = "TIME_STEP_LENGTH";
pub const ENHANCED_SAMPLING_METHOD_NAME: &str = "ENHANCED_SAMPLING_METHOD_NAME";

pub const QM_METHOD_NAME: &str = "QM_METHOD_NAME";
pub const QM_EXCHANGE_CORRELATION: &str = "QM_EXCHANGE_CORRELATION";
pub const QM_BASIS_SET: &str = "QM_BASIS_SET";
pub const QM_SPIN_MULTIPLICITY: &str = "QM_SPIN_MULTIPLICITY";
pub const CALCULATION: &str = "CALCULATION";

// --- Per-file metadata of tabular data ---
pub const DATA_LABELS: &str = "DATA_LABELS";
pub const DATA_UNITS: &str = "DATA_UNITS";

/// Solvent type value that triggers the implicit-model suffix.
pub const SOLVENT_IMPLICIT: &str = "implicit";

pub(crate) static STANDARD_TERMS: Map<&'static str, &'static str> = phf_map! {
    "MOLECULAR_SYSTEM_DESCRIPTION" => "Molecular system",
    "MOLECULE_TYPE" => "Molecule type",
    "MOLECULE_DESCRIPTION" => "Molecule description",
    "RESIDUE_CHAIN" => "Residue chain",
    "RESIDUE_CHAIN_NORM" => "Normalized residue chain",
    "RESIDUE_NON_STD" => "Non-standard residues",
    "CHEMICAL_FORMULA" => "Chemical formula",
    "MOLECULE_ATOMIC_COMPOSITION" => "Molecular composition",
    "MOLECULE_ATOMIC_WEIGHT" => "Molecular weight",
    "COUNT_ATOMS" => "Number of atoms",
    "COUNT_IONS" => "Number of ions",
    "COUNT_SOLVENT" => "Number of solvent molecules",
    "TOTAL_MOLECULE_CHARGE" => "Total charge",
    "COMPUTATIONAL_METHOD_NAME" => "Computational method",
    "BOUNDARY_CONDITIONS" => "Boundary conditions",
    "SOLVENT_TYPE" => "Solvent",
    "IMPLICIT_SOLVENT_MODEL" => "Implicit solvent model",
    "FORCE_FIELD" => "Force field",
    "MM_INTEGRATOR" => "Integrator",
    "ELECTROSTATICS_MODELING" => "Electrostatics",
    "UNIT_SHAPE" => "Unit cell shape",
    "ENSEMBLE_MODELING" => "Ensemble",
    "BAROSTAT_ALGORITHM" => "Barostat",
    "THERMOSTAT_ALGORITHM" => "Thermostat",
    "REFERENCE_TEMPERATURE" => "Reference temperature",
    "REFERENCE_PRESSURE" => "Reference pressure",
    "CONSTRAINT_ALGORITHM" => "Constraints",
    "RESTRAINT_TYPE" => "Restraints",
    "LANGEVIN_COLLISION_FREQUENCY" => "Langevin collision frequency",
    "STOCHASTICS_NOISE_TERM_AMPLITUDE" => "Stochastic noise amplitude",
    "SIMULATED_TIME" => "Simulated time",
    "TIME_STEP_LENGTH" => "Time step",
    "ENHANCED_SAMPLING_METHOD_NAME" => "Enhanced sampling",
    "QM_METHOD_NAME" => "QM method",
    "QM_EXCHANGE_CORRELATION" => "Exchange-correlation functional",
    "QM_BASIS_SET" => "Basis set",
    "QM_SPIN_MULTIPLICITY" => "Spin multiplicity",
    "CALCULATION" => "Calculation",
    "DATA_LABELS" => "Data labels",
    "DATA_UNITS" => "Data units",
};

/// An attribute line of a report section: the code to look up and its unit suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    pub code: &'static str,
    pub unit: &'static str,
}

const fn spec(code: &'static str, unit: &'static str) -> AttributeSpec {
    AttributeSpec { code, unit }
}

/// Topology attributes listed before the atomic composition.
pub const TOPOLOGY_HEAD: &[AttributeSpec] = &[
    spec(MOLECULAR_SYSTEM_DESCRIPTION, ""),
    spec(MOLECULE_TYPE, ""),
    spec(MOLECULE_DESCRIPTION, ""),
    spec(RESIDUE_CHAIN, ""),
    spec(RESIDUE_CHAIN_NORM, ""),
    spec(RESIDUE_NON_STD, ""),
    spec(CHEMICAL_FORMULA, ""),
];

/// Topology attributes listed after the atomic composition.
pub const TOPOLOGY_TAIL: &[AttributeSpec] = &[
    spec(MOLECULE_ATOMIC_WEIGHT, "g/mol"),
    spec(COUNT_ATOMS, ""),
    spec(COUNT_IONS, ""),
    spec(COUNT_SOLVENT, ""),
];

pub const CLASSICAL_GROUP: &[AttributeSpec] = &[
    spec(FORCE_FIELD, ""),
    spec(MM_INTEGRATOR, ""),
    spec(ELECTROSTATICS_MODELING, ""),
    spec(UNIT_SHAPE, ""),
    spec(ENSEMBLE_MODELING, ""),
    spec(BAROSTAT_ALGORITHM, ""),
    spec(THERMOSTAT_ALGORITHM, ""),
    spec(REFERENCE_TEMPERATURE, "K"),
    spec(REFERENCE_PRESSURE, "bar"),
    spec(CONSTRAINT_ALGORITHM, ""),
    spec(RESTRAINT_TYPE, ""),
    spec(LANGEVIN_COLLISION_FREQUENCY, "ps-1"),
    spec(STOCHASTICS_NOISE_TERM_AMPLITUDE, ""),
    spec(SIMULATED_TIME, "ns"),
    spec(TIME_STEP_LENGTH, "ps"),
    spec(ENHANCED_SAMPLING_METHOD_NAME, ""),
];

pub const QUANTUM_GROUP: &[AttributeSpec] = &[
    spec(QM_METHOD_NAME, ""),
    spec(QM_EXCHANGE_CORRELATION, ""),
    spec(QM_BASIS_SET, ""),
    spec(QM_SPIN_MULTIPLICITY, ""),
    spec(TOTAL_MOLECULE_CHARGE, ""),
    spec(CALCULATION, ""),
];
