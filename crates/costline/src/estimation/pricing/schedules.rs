use crate::estimation::domain::BuildingType;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseTemplate {
    pub name: &'static str,
    pub start_month: u32,
    pub duration_months: u32,
}

/// Construction calendar; phases may overlap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleTemplate {
    pub total_months: u32,
    pub phases: Vec<PhaseTemplate>,
}

fn schedule(total_months: u32, phases: &[(&'static str, u32, u32)]) -> ScheduleTemplate {
    ScheduleTemplate {
        total_months,
        phases: phases
            .iter()
            .map(|(name, start_month, duration_months)| PhaseTemplate {
                name,
                start_month: *start_month,
                duration_months: *duration_months,
            })
            .collect(),
    }
}

/// Baseline used when neither the subtype nor the building type has a calendar.
pub fn global_schedule() -> ScheduleTemplate {
    schedule(
        14,
        &[
            ("Preconstruction", 0, 2),
            ("Foundations", 2, 2),
            ("Structure", 3, 4),
            ("Envelope", 6, 3),
            ("MEP Rough-In", 7, 5),
            ("Interiors", 9, 4),
            ("Closeout", 13, 2),
        ],
    )
}

/// Building-type calendars. Civic work has none and uses the global baseline.
pub fn building_type_schedule(building_type: BuildingType) -> Option<ScheduleTemplate> {
    let template = match building_type {
        BuildingType::Multifamily => schedule(
            16,
            &[
                ("Preconstruction", 0, 2),
                ("Site & Foundations", 2, 3),
                ("Structure", 4, 5),
                ("Envelope", 8, 3),
                ("MEP Rough-In", 8, 5),
                ("Unit Interiors", 11, 4),
                ("Closeout", 15, 2),
            ],
        ),
        BuildingType::Office => schedule(
            16,
            &[
                ("Preconstruction", 0, 2),
                ("Foundations", 2, 2),
                ("Structure", 3, 5),
                ("Curtain Wall", 7, 3),
                ("MEP Rough-In", 7, 6),
                ("Interiors", 10, 5),
                ("Closeout", 15, 1),
            ],
        ),
        BuildingType::Retail => schedule(
            10,
            &[
                ("Preconstruction", 0, 1),
                ("Sitework & Foundations", 1, 2),
                ("Structure & Shell", 2, 3),
                ("MEP Rough-In", 4, 3),
                ("Storefronts & Interiors", 6, 3),
                ("Closeout", 9, 1),
            ],
        ),
        BuildingType::Restaurant => schedule(
            8,
            &[
                ("Preconstruction", 0, 1),
                ("Sitework & Foundations", 1, 2),
                ("Structure & Shell", 2, 2),
                ("Kitchen MEP", 3, 3),
                ("Interiors & Equipment", 5, 2),
                ("Health Inspection & Opening", 7, 1),
            ],
        ),
        BuildingType::Hospitality => schedule(
            20,
            &[
                ("Preconstruction", 0, 3),
                ("Foundations", 3, 2),
                ("Structure", 4, 6),
                ("Envelope", 9, 4),
                ("MEP Rough-In", 9, 6),
                ("Guestroom Fit-Out", 13, 5),
                ("FF&E & Closeout", 18, 2),
            ],
        ),
        BuildingType::Healthcare => schedule(
            20,
            &[
                ("Preconstruction", 0, 3),
                ("Site & Foundations", 2, 4),
                ("Structure", 5, 5),
                ("MEP Systems", 8, 6),
                ("Interiors", 12, 6),
                ("Medical Equipment", 16, 4),
                ("Commissioning & Closeout", 19, 2),
            ],
        ),
        BuildingType::Educational => schedule(
            18,
            &[
                ("Preconstruction", 0, 3),
                ("Foundations", 3, 2),
                ("Structure", 4, 5),
                ("Envelope", 8, 3),
                ("MEP Rough-In", 8, 5),
                ("Interiors", 12, 4),
                ("Closeout", 16, 2),
            ],
        ),
        BuildingType::Industrial => schedule(
            10,
            &[
                ("Preconstruction", 0, 1),
                ("Sitework & Slab", 1, 3),
                ("Tilt-Up & Steel", 3, 3),
                ("Roof & MEP", 5, 3),
                ("Office Buildout", 7, 2),
                ("Closeout", 9, 1),
            ],
        ),
        BuildingType::MixedUse => schedule(
            22,
            &[
                ("Preconstruction", 0, 3),
                ("Foundations & Podium", 3, 4),
                ("Structure", 6, 6),
                ("Envelope", 11, 4),
                ("MEP Rough-In", 11, 6),
                ("Interiors", 15, 5),
                ("Closeout", 20, 2),
            ],
        ),
        BuildingType::Civic => return None,
    };
    Some(template)
}

/// Subtype calendars that differ materially from their building type.
pub fn subtype_schedules() -> Vec<(BuildingType, &'static str, ScheduleTemplate)> {
    vec![
        (
            BuildingType::Healthcare,
            "surgical_center",
            schedule(
                18,
                &[
                    ("Preconstruction", 0, 3),
                    ("Site & Foundations", 2, 3),
                    ("Structure", 4, 4),
                    ("MEP Systems", 7, 6),
                    ("OR Fit-Out", 11, 5),
                    ("Medical Equipment", 14, 3),
                    ("Commissioning & Licensing", 17, 2),
                ],
            ),
        ),
        (
            BuildingType::Healthcare,
            "hospital",
            schedule(
                36,
                &[
                    ("Preconstruction", 0, 6),
                    ("Site & Foundations", 5, 6),
                    ("Structure", 10, 9),
                    ("MEP Systems", 16, 12),
                    ("Interiors", 24, 9),
                    ("Medical Equipment", 30, 5),
                    ("Commissioning & Closeout", 34, 3),
                ],
            ),
        ),
        (
            BuildingType::Hospitality,
            "full_service_hotel",
            schedule(
                26,
                &[
                    ("Preconstruction", 0, 4),
                    ("Foundations", 4, 3),
                    ("Structure", 6, 7),
                    ("Envelope", 12, 5),
                    ("MEP Rough-In", 12, 7),
                    ("Guestroom & Amenity Fit-Out", 17, 7),
                    ("FF&E & Closeout", 24, 2),
                ],
            ),
        ),
        (
            BuildingType::Industrial,
            "distribution_center",
            schedule(
                11,
                &[
                    ("Preconstruction", 0, 1),
                    ("Sitework & Slab", 1, 3),
                    ("Tilt-Up & Steel", 3, 4),
                    ("Roof & MEP", 6, 3),
                    ("Dock Equipment & Office", 8, 2),
                    ("Closeout", 10, 1),
                ],
            ),
        ),
    ]
}
