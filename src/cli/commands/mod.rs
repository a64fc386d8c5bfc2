pub mod desire;
pub mod summary;
pub mod system;

use crate::cli::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in desire::definitions()
        .into_iter()
        .chain(summary::definitions())
        .chain(system::definitions())
    {
        registry.register(entry);
    }
}
