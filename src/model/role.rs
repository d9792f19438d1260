/// Portal role, deciding the visible menu and the API namespace the client
/// talks to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PortalRole {
    Admin,
    Doctor,
    Patient,
    Staff(StaffRole),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StaffRole {
    Reception,
    Nurse,
    Lab,
    Pharmacy,
}

impl PortalRole {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "admin" => Some(PortalRole::Admin),
            "doctor" => Some(PortalRole::Doctor),
            "patient" => Some(PortalRole::Patient),
            "reception" => Some(PortalRole::Staff(StaffRole::Reception)),
            "nurse" => Some(PortalRole::Staff(StaffRole::Nurse)),
            "lab" => Some(PortalRole::Staff(StaffRole::Lab)),
            "pharmacy" => Some(PortalRole::Staff(StaffRole::Pharmacy)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PortalRole::Admin => "admin",
            PortalRole::Doctor => "doctor",
            PortalRole::Patient => "patient",
            PortalRole::Staff(StaffRole::Reception) => "reception",
            PortalRole::Staff(StaffRole::Nurse) => "nurse",
            PortalRole::Staff(StaffRole::Lab) => "lab",
            PortalRole::Staff(StaffRole::Pharmacy) => "pharmacy",
        }
    }

    /// Path segment used for notification recipient routes,
    /// e.g. `/notifications/doctor/42`.
    pub fn recipient_segment(&self) -> &'static str {
        match self {
            PortalRole::Admin => "admin",
            PortalRole::Doctor => "doctor",
            PortalRole::Patient => "patient",
            PortalRole::Staff(_) => "staff",
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, PortalRole::Staff(_))
    }
}
