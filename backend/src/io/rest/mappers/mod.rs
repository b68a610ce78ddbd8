pub mod allotment_mapper;
pub mod labour_mapper;
pub mod resident_mapper;
