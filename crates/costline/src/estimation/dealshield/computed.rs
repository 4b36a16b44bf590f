use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvenanceStatus {
    /// Derived from a scenario snapshot.
    Computed,
    /// Read straight from policy or profile configuration.
    Configured,
    Unavailable,
}

/// Where a value came from, or why it is missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Provenance {
    pub status: ProvenanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<String>,
}

/// A value paired with its provenance. `value` is `None` exactly when the status is
/// [`ProvenanceStatus::Unavailable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Computed<T> {
    pub value: Option<T>,
    pub provenance: Provenance,
}

fn collect<I, S>(sources: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    sources.into_iter().map(Into::into).collect()
}

impl<T> Computed<T> {
    pub fn computed<I, S>(value: T, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::available(value, ProvenanceStatus::Computed, collect(sources))
    }

    pub fn configured<I, S>(value: T, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::available(value, ProvenanceStatus::Configured, collect(sources))
    }

    pub fn unavailable<I, S>(reason: impl Into<String>, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value: None,
            provenance: Provenance {
                status: ProvenanceStatus::Unavailable,
                reason: Some(reason.into()),
                sources: collect(sources),
                scenario_id: None,
            },
        }
    }

    fn available(value: T, status: ProvenanceStatus, sources: Vec<String>) -> Self {
        Self {
            value: Some(value),
            provenance: Provenance {
                status,
                reason: None,
                sources,
                scenario_id: None,
            },
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.provenance.reason = Some(reason.into());
        self
    }

    pub fn in_scenario(mut self, scenario_id: impl Into<String>) -> Self {
        self.provenance.scenario_id = Some(scenario_id.into());
        self
    }

    pub fn as_ref(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_values_carry_a_reason() {
        let cell: Computed<f64> = Computed::unavailable("no financing", ["debt_metrics"]);
        assert!(cell.as_ref().is_none());
        assert_eq!(cell.provenance.status, ProvenanceStatus::Unavailable);
        assert_eq!(cell.provenance.reason.as_deref(), Some("no financing"));
    }

    #[test]
    fn serializes_value_and_provenance_side_by_side() {
        let cell = Computed::computed(1.42, ["ownership_analysis.debt_metrics.calculated_dscr"])
            .in_scenario("base");
        let json = serde_json::to_value(&cell).expect("json");
        assert_eq!(json["value"], 1.42);
        assert_eq!(json["provenance"]["status"], "computed");
        assert_eq!(json["provenance"]["scenario_id"], "base");
        assert!(json["provenance"].get("reason").is_none());
    }
}
