/// SIMBAD object types worth mentioning to the describer.
///
/// This enum is both the allow-list applied to catalog rows and the table
/// used to expand short codes into readable labels. Add new types here only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Galaxy,
    ClusterOfGalaxies,
    GroupOfGalaxies,
    InteractingGalaxies,
    PlanetaryNebula,
    InterstellarCloud,
    SupernovaRemnant,
    SupernovaRemnantCandidate,
    Quasar,
    PairOfGalaxies,
    CompactGroupOfGalaxies,
    SuperclusterOfGalaxies,
    EmissionLineGalaxy,
    NeutronStar,
    Pulsar,
    YoungStellarObject,
    BlueSupergiant,
}

impl ObjectType {
    pub const ALL: [ObjectType; 17] = [
        ObjectType::Galaxy,
        ObjectType::ClusterOfGalaxies,
        ObjectType::GroupOfGalaxies,
        ObjectType::InteractingGalaxies,
        ObjectType::PlanetaryNebula,
        ObjectType::InterstellarCloud,
        ObjectType::SupernovaRemnant,
        ObjectType::SupernovaRemnantCandidate,
        ObjectType::Quasar,
        ObjectType::PairOfGalaxies,
        ObjectType::CompactGroupOfGalaxies,
        ObjectType::SuperclusterOfGalaxies,
        ObjectType::EmissionLineGalaxy,
        ObjectType::NeutronStar,
        ObjectType::Pulsar,
        ObjectType::YoungStellarObject,
        ObjectType::BlueSupergiant,
    ];

    /// Catalog code as stored in SIMBAD's `otype` column
    pub fn code(self) -> &'static str {
        match self {
            ObjectType::Galaxy => "G",
            ObjectType::ClusterOfGalaxies => "ClG",
            ObjectType::GroupOfGalaxies => "GrG",
            ObjectType::InteractingGalaxies => "IG",
            ObjectType::PlanetaryNebula => "PN",
            ObjectType::InterstellarCloud => "Cld",
            ObjectType::SupernovaRemnant => "SNR",
            ObjectType::SupernovaRemnantCandidate => "s?r",
            ObjectType::Quasar => "QSO",
            ObjectType::PairOfGalaxies => "PaG",
            ObjectType::CompactGroupOfGalaxies => "PCG",
            ObjectType::SuperclusterOfGalaxies => "SCG",
            ObjectType::EmissionLineGalaxy => "GNe",
            ObjectType::NeutronStar => "N*",
            ObjectType::Pulsar => "Psr",
            ObjectType::YoungStellarObject => "s*y",
            ObjectType::BlueSupergiant => "s*b",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ObjectType::Galaxy => "Galaxy",
            ObjectType::ClusterOfGalaxies => "Cluster of Galaxies",
            ObjectType::GroupOfGalaxies => "Group of Galaxies",
            ObjectType::InteractingGalaxies => "Interacting Galaxies",
            ObjectType::PlanetaryNebula => "Planetary Nebula",
            ObjectType::InterstellarCloud => "Interstellar Cloud",
            ObjectType::SupernovaRemnant => "Supernova Remnant",
            ObjectType::SupernovaRemnantCandidate => "Candidate Supernova Remnant",
            ObjectType::Quasar => "Quasar",
            ObjectType::PairOfGalaxies => "Pair of Galaxies",
            ObjectType::CompactGroupOfGalaxies => "Compact Group of Galaxies",
            ObjectType::SuperclusterOfGalaxies => "Supercluster of Galaxies",
            ObjectType::EmissionLineGalaxy => "Emission-Line Galaxy",
            ObjectType::NeutronStar => "Neutron Star",
            ObjectType::Pulsar => "Pulsar",
            ObjectType::YoungStellarObject => "Young Stellar Object",
            ObjectType::BlueSupergiant => "Blue Supergiant Star",
        }
    }

    /// Exact, case-sensitive match: SIMBAD distinguishes `G` from `g`.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }
}

pub fn is_allowed(code: &str) -> bool {
    ObjectType::from_code(code).is_some()
}

/// Readable label for a catalog code, or the code itself when unknown.
pub fn expand_type_code(code: &str) -> &str {
    match ObjectType::from_code(code) {
        Some(object_type) => object_type.label(),
        None => code,
    }
}
