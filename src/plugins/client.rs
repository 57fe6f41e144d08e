use super::storage::CLIENT_DEFAULT_FILE;
use super::{Plugin, SharedStorage};
use crate::codegen::ast::{ConstDeclaration, Expr, Statement};
use crate::dependency::DependencyManager;
use crate::error::Result;
use crate::processors::FRONTEND_PACKAGE;

pub const PATH: &str = "client";

/// Emits the default client module unless a hand-written override exists in
/// the output directory.
pub struct ClientPlugin;

impl Plugin for ClientPlugin {
    fn name(&self) -> &str {
        "ClientPlugin"
    }

    fn path(&self) -> &str {
        PATH
    }

    fn execute(&self, storage: &mut SharedStorage<'_>) -> Result<()> {
        if storage.options.has_client_override() {
            tracing::info!("client override found, skipping default client");
            return Ok(());
        }

        let mut dependencies = DependencyManager::new(storage.options.paths());
        let connect_client = dependencies
            .imports
            .add_named(FRONTEND_PACKAGE, "ConnectClient", false);
        let client = dependencies.mint("client");

        let declaration = Statement::Const(ConstDeclaration {
            name: client.clone(),
            ty: None,
            init: Expr::new_instance(
                Expr::ident(connect_client),
                vec![Expr::Object(vec![(
                    "prefix".to_string(),
                    Expr::Str(storage.options.client_prefix.clone()),
                )])],
            ),
        });
        dependencies.exports.set_default(client);

        storage
            .sources
            .add(dependencies.assemble(CLIENT_DEFAULT_FILE, vec![declaration]));
        Ok(())
    }
}
