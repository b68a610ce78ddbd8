use crate::domain::models::resident::Resident as DomainResident;
use shared::Resident as SharedResident;

/// Mapper between shared resident DTOs and domain models.
pub struct ResidentMapper;

impl ResidentMapper {
    pub fn to_dto(domain: DomainResident) -> SharedResident {
        SharedResident {
            user_id: domain.user_id,
            username: domain.username,
            user_address: domain.user_address,
            contact: domain.contact,
            street: domain.street,
            latitude: domain.latitude,
            longitude: domain.longitude,
            today_status: domain.today_status,
        }
    }
}
