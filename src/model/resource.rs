/// Plain relational resources the dashboards display. These carry no
/// client-side lifecycle: the list simply reflects the last successful fetch,
/// so they travel as untyped rows through the read cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceKind {
    Patients,
    Doctors,
    Appointments,
    Billing,
    Medicines,
    Beds,
    Vitals,
    EmergencyAlerts,
}

impl ResourceKind {
    pub fn path(&self) -> String {
        format!("/{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_use_kebab_case() {
        assert_eq!(ResourceKind::Patients.path(), "/patients");
        assert_eq!(ResourceKind::EmergencyAlerts.path(), "/emergency-alerts");
    }
}
