pub mod donation_mapper;
