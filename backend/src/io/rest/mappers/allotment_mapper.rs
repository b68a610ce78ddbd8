use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::models::allotment::{
    Allotment as DomainAllotment, AllotmentError, CollectionPoint as DomainCollectionPoint,
};
use shared::{Allotment as SharedAllotment, CollectionPoint as SharedCollectionPoint};

/// Mapper between shared allotment DTOs and domain models. Dates and status
/// strings are normalized here, at the boundary, so call sites never deal
/// with the clients' format drift.
pub struct AllotmentMapper;

impl AllotmentMapper {
    /// Parse a client-supplied date. The mobile clients send either a plain
    /// calendar date or a midnight-UTC RFC 3339 datetime; both normalize to
    /// the same canonical date-only value.
    pub fn parse_date(raw: &str) -> Result<NaiveDate> {
        let raw = raw.trim();

        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(date);
        }
        if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
            return Ok(datetime.with_timezone(&Utc).date_naive());
        }
        if raw.len() > 10 {
            if let Ok(date) = NaiveDate::parse_from_str(&raw[..10], "%Y-%m-%d") {
                return Ok(date);
            }
        }

        Err(AllotmentError::Validation(format!("Invalid date: {}", raw)).into())
    }

    pub fn point_to_domain(dto: SharedCollectionPoint) -> Result<DomainCollectionPoint> {
        let acknowledged_at = dto
            .acknowledged_at
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|t| t.with_timezone(&Utc))
                    .context("Failed to parse acknowledgedAt timestamp")
            })
            .transpose()?;

        Ok(DomainCollectionPoint {
            user_id: dto.user_id,
            username: dto.username,
            user_address: dto.user_address,
            contact: dto.contact,
            latitude: dto.latitude,
            longitude: dto.longitude,
            today_status: dto.today_status,
            labour_collected: dto.labour_collected,
            collection_confirmed: dto.collection_confirmed,
            acknowledged_at,
        })
    }

    pub fn points_to_domain(dtos: Vec<SharedCollectionPoint>) -> Result<Vec<DomainCollectionPoint>> {
        dtos.into_iter().map(Self::point_to_domain).collect()
    }

    pub fn point_to_dto(domain: DomainCollectionPoint) -> SharedCollectionPoint {
        SharedCollectionPoint {
            user_id: domain.user_id,
            username: domain.username,
            user_address: domain.user_address,
            contact: domain.contact,
            latitude: domain.latitude,
            longitude: domain.longitude,
            today_status: domain.today_status,
            labour_collected: domain.labour_collected,
            collection_confirmed: domain.collection_confirmed,
            acknowledged_at: domain.acknowledged_at.map(|t| t.to_rfc3339()),
        }
    }

    pub fn to_dto(domain: DomainAllotment) -> SharedAllotment {
        SharedAllotment {
            id: domain.id,
            incharger_id: domain.incharger_id,
            incharger_name: domain.incharger_name,
            labour_id: domain.labour_id,
            labour_name: domain.labour_name,
            labour_phone_number: domain.labour_phone_number,
            street: domain.street,
            date: domain.date.format("%Y-%m-%d").to_string(),
            time: domain.time,
            status: domain.status,
            location_data: domain
                .location_data
                .into_iter()
                .map(Self::point_to_dto)
                .collect(),
            complaint_id: domain.complaint_id,
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
            collected_at: domain.collected_at.map(|t| t.to_rfc3339()),
        }
    }

    pub fn to_list_dto(domain: Vec<DomainAllotment>) -> Vec<SharedAllotment> {
        domain.into_iter().map(Self::to_dto).collect()
    }
}
