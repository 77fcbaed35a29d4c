use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Organisation propriétaire des kits et des salons.
    OrgId
);
string_id!(
    /// Identifiant fort pour Kit
    KitId
);
string_id!(
    /// Identifiant fort pour Show (fourni par le calendrier externe)
    ShowId
);
string_id!(
    /// Identifiant fort pour Assignment
    AssignmentId
);

impl Default for OrgId {
    fn default() -> Self {
        Self::new("default")
    }
}

/// Gamme de kit (ensemble fermé).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KitType {
    Flagship,
    Standard,
    Compact,
    Tabletop,
}

impl KitType {
    pub fn as_str(self) -> &'static str {
        match self {
            KitType::Flagship => "flagship",
            KitType::Standard => "standard",
            KitType::Compact => "compact",
            KitType::Tabletop => "tabletop",
        }
    }
}

impl fmt::Display for KitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flagship" => Ok(KitType::Flagship),
            "standard" => Ok(KitType::Standard),
            "compact" => Ok(KitType::Compact),
            "tabletop" => Ok(KitType::Tabletop),
            other => Err(format!("unknown kit type: {other}")),
        }
    }
}

/// Statut indicatif d'un kit. Le ledger fait foi pour la planification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KitStatus {
    #[default]
    Available,
    Assigned,
    InTransit,
    AtShow,
    Maintenance,
}

impl std::str::FromStr for KitStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "available" => Ok(KitStatus::Available),
            "assigned" => Ok(KitStatus::Assigned),
            "in_transit" => Ok(KitStatus::InTransit),
            "at_show" => Ok(KitStatus::AtShow),
            "maintenance" => Ok(KitStatus::Maintenance),
            other => Err(format!("unknown kit status: {other}")),
        }
    }
}

/// Ligne de la liste de colisage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackingItem {
    pub name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

/// Kit de stand physique et réutilisable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kit {
    pub id: KitId,
    pub org: OrgId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    pub kit_type: KitType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<PackingItem>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub status: KitStatus,
    #[serde(default)]
    pub current_location: Option<String>,
    pub home_base: String,
    pub default_ship_days: u32,
    pub default_return_days: u32,
    #[serde(default)]
    pub replacement_value: Option<f64>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Kit {
    pub fn new<N: Into<String>, H: Into<String>>(
        org: OrgId,
        name: N,
        kit_type: KitType,
        home_base: H,
        default_ship_days: u32,
        default_return_days: u32,
    ) -> Self {
        Self {
            id: KitId::random(),
            org,
            name: name.into(),
            code: None,
            kit_type,
            contents: Vec::new(),
            dimensions: None,
            status: KitStatus::Available,
            current_location: None,
            home_base: home_base.into(),
            default_ship_days,
            default_return_days,
            replacement_value: None,
            active: true,
        }
    }

    pub fn with_id(mut self, id: KitId) -> Self {
        self.id = id;
        self
    }
}

/// Salon consommé en lecture seule depuis le calendrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    pub id: ShowId,
    pub org: OrgId,
    pub name: String,
    #[serde(default)]
    pub location: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Show {
    pub fn new<N: Into<String>, L: Into<String>>(
        org: OrgId,
        name: N,
        location: L,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: ShowId::random(),
            org,
            name: name.into(),
            location: location.into(),
            start,
            end,
        }
    }

    pub fn with_id(mut self, id: ShowId) -> Self {
        self.id = id;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Planned,
    Confirmed,
    Shipped,
    AtVenue,
    Returned,
    Cancelled,
}

impl AssignmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AssignmentStatus::Returned | AssignmentStatus::Cancelled)
    }

    /// Une affectation bloque la fenêtre de son kit tant qu'elle n'est ni
    /// annulée ni rentrée.
    pub fn is_blocking(self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Planned => "planned",
            AssignmentStatus::Confirmed => "confirmed",
            AssignmentStatus::Shipped => "shipped",
            AssignmentStatus::AtVenue => "at_venue",
            AssignmentStatus::Returned => "returned",
            AssignmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "planned" => Ok(AssignmentStatus::Planned),
            "confirmed" => Ok(AssignmentStatus::Confirmed),
            "shipped" => Ok(AssignmentStatus::Shipped),
            "at_venue" => Ok(AssignmentStatus::AtVenue),
            "returned" => Ok(AssignmentStatus::Returned),
            "cancelled" | "canceled" => Ok(AssignmentStatus::Cancelled),
            other => Err(format!("unknown assignment status: {other}")),
        }
    }
}

/// Dates logistiques connues d'une affectation (toutes optionnelles).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDates {
    #[serde(default)]
    pub ship_date: Option<NaiveDate>,
    #[serde(default)]
    pub arrival_date: Option<NaiveDate>,
    #[serde(default)]
    pub return_ship_date: Option<NaiveDate>,
    #[serde(default)]
    pub return_arrival_date: Option<NaiveDate>,
}

/// Affectation d'un kit à un salon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub kit_id: KitId,
    pub show_id: ShowId,
    pub status: AssignmentStatus,
    #[serde(flatten)]
    pub dates: AssignmentDates,
    #[serde(default)]
    pub outbound_carrier: Option<String>,
    #[serde(default)]
    pub outbound_tracking: Option<String>,
    #[serde(default)]
    pub return_carrier: Option<String>,
    #[serde(default)]
    pub return_tracking: Option<String>,
    #[serde(default)]
    pub ai_recommended: bool,
    #[serde(default)]
    pub ai_recommendation_reason: Option<String>,
    #[serde(default)]
    pub ai_confidence: Option<f64>,
    #[serde(default)]
    pub notes: String,
}

impl Assignment {
    pub fn new(kit_id: KitId, show_id: ShowId) -> Self {
        Self {
            id: AssignmentId::random(),
            kit_id,
            show_id,
            status: AssignmentStatus::Planned,
            dates: AssignmentDates::default(),
            outbound_carrier: None,
            outbound_tracking: None,
            return_carrier: None,
            return_tracking: None,
            ai_recommended: false,
            ai_recommendation_reason: None,
            ai_confidence: None,
            notes: String::new(),
        }
    }
}

/// Agrégat persisté : catalogue, calendrier et registre des affectations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Ledger {
    #[serde(default)]
    pub kits: Vec<Kit>,
    #[serde(default)]
    pub shows: Vec<Show>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl Ledger {
    pub fn find_kit(&self, id: &KitId) -> Option<&Kit> {
        self.kits.iter().find(|k| &k.id == id)
    }
    pub fn find_kit_mut(&mut self, id: &KitId) -> Option<&mut Kit> {
        self.kits.iter_mut().find(|k| &k.id == id)
    }
    pub fn find_show(&self, id: &ShowId) -> Option<&Show> {
        self.shows.iter().find(|s| &s.id == id)
    }
    pub fn find_assignment(&self, id: &AssignmentId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| &a.id == id)
    }
    pub fn find_assignment_mut(&mut self, id: &AssignmentId) -> Option<&mut Assignment> {
        self.assignments.iter_mut().find(|a| &a.id == id)
    }

    /// Vrai si le salon a une affectation non annulée, rentrée comprise :
    /// un salon déjà servi n'est plus à pourvoir.
    pub fn show_has_active_assignment(&self, id: &ShowId) -> bool {
        self.assignments
            .iter()
            .any(|a| &a.show_id == id && a.status != AssignmentStatus::Cancelled)
    }
}
