use crate::domain::models::labour::Labour as DomainLabour;
use crate::domain::suitability::ScoredLabour;
use shared::{Labour as SharedLabour, SuitabilityCandidate};

/// Mapper between shared labour DTOs and domain models.
pub struct LabourMapper;

impl LabourMapper {
    pub fn to_dto(domain: DomainLabour) -> SharedLabour {
        SharedLabour {
            id: domain.id,
            name: domain.name,
            phone_number: domain.phone_number,
            labour_working_area: domain.working_areas,
            office: domain.office,
            incharger_id: domain.incharger_id,
            incharger_name: domain.incharger_name,
            incharger_phone: domain.incharger_phone,
            last_latitude: domain.last_latitude,
            last_longitude: domain.last_longitude,
        }
    }

    pub fn to_list_dto(domain: Vec<DomainLabour>) -> Vec<SharedLabour> {
        domain.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_candidate_dto(scored: ScoredLabour) -> SuitabilityCandidate {
        SuitabilityCandidate {
            labour: Self::to_dto(scored.labour),
            suitability_score: scored.score,
        }
    }
}
