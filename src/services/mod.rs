use std::sync::Arc;

use actix_web::web;

mod link;
mod link_allocator;

pub use link::{LinkService, LinkServiceTrait};
pub use link_allocator::LinkAllocator;

use crate::{
    config::AllocatorConfig, repositories::LinkRepositoryTrait,
    utils::id_generator::RandomKeyGenerator,
};

/// Service Register
pub fn register<R>(repository: Arc<R>, allocator: AllocatorConfig, cfg: &mut web::ServiceConfig)
where
    R: LinkRepositoryTrait + 'static,
{
    let generator = RandomKeyGenerator::from_config(&allocator);
    let link_allocator = LinkAllocator::new(repository.clone(), generator, allocator);
    let link_service = LinkService::new(repository);
    cfg.app_data(web::Data::new(link_allocator));
    cfg.app_data(web::Data::new(link_service));
}
