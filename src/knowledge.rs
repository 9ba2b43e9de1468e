//! Built-in sample documentation.
//!
//! A small FiveM/QBCore/ESX corpus used to seed a fresh database so the
//! search path can be exercised before any user documents are uploaded.

use crate::core::errors::RagError;
use crate::rag::{ChunkMetadata, DocumentInput, IngestOptions, IngestSummary, RagPipeline};

fn doc(
    content: &str,
    source: &str,
    framework: &str,
    doc_type: &str,
    title: &str,
    category: &str,
) -> DocumentInput {
    DocumentInput {
        content: content.to_string(),
        metadata: ChunkMetadata {
            source: source.to_string(),
            framework: framework.to_string(),
            doc_type: doc_type.to_string(),
            title: Some(title.to_string()),
            category: Some(category.to_string()),
            file_path: None,
            line_number: None,
        },
    }
}

/// The bundled sample corpus.
pub fn sample_documents() -> Vec<DocumentInput> {
    vec![
        doc(
            "GetPlayerPed(playerId) -> Ped\n\n\
             Returns the ped handle for the specified player.\n\n\
             Parameters:\n- playerId: The player ID (integer)\n\n\
             Example:\nlocal playerPed = GetPlayerPed(PlayerId())\n\
             local coords = GetEntityCoords(playerPed)",
            "fivem-natives",
            "fivem",
            "native",
            "GetPlayerPed",
            "player",
        ),
        doc(
            "RegisterNetEvent(eventName, eventHandler)\n\n\
             Registers a network event handler that can receive data from server or client.\n\n\
             Security Note: Always validate the source and data parameters.\n\n\
             Example:\nRegisterNetEvent('myresource:client:notify', function(message)\n    \
             print('Received message:', message)\nend)",
            "fivem-docs",
            "fivem",
            "function",
            "RegisterNetEvent",
            "events",
        ),
        doc(
            "Wait(ms)\n\n\
             Pauses script execution for the specified number of milliseconds.\n\n\
             Performance Notes:\n- Use Wait(0) sparingly as it can impact performance\n\
             - Always include Wait() in while loops to prevent server freezing\n\n\
             Example:\nCreateThread(function()\n    while true do\n        Wait(1000)\n    \
             end\nend)",
            "fivem-performance",
            "fivem",
            "function",
            "Wait",
            "performance",
        ),
        doc(
            "QBCore.Functions.GetPlayer(source) -> Player\n\n\
             Retrieves player data from the server using the player's server ID.\n\n\
             Returns the Player object with job, money and items, or nil if not found.\n\n\
             Example:\nlocal Player = QBCore.Functions.GetPlayer(source)\n\
             if not Player then return end\nlocal playerJob = Player.PlayerData.job.name",
            "qbcore-docs",
            "qbcore",
            "function",
            "QBCore.Functions.GetPlayer",
            "player",
        ),
        doc(
            "QBCore.Commands.Add(name, help, arguments, argsrequired, callback, permission)\n\n\
             Adds a new command to the QBCore command system.\n\n\
             Example:\nQBCore.Commands.Add('heal', 'Heal yourself', {}, false, \
             function(source, args)\n    local Player = QBCore.Functions.GetPlayer(source)\n    \
             if not Player then return end\n    \
             TriggerClientEvent('hospital:client:Revive', source)\nend, 'admin')",
            "qbcore-docs",
            "qbcore",
            "function",
            "QBCore.Commands.Add",
            "commands",
        ),
        doc(
            "ESX.GetPlayerFromId(playerId) -> xPlayer\n\n\
             Gets the ESX player object from server ID.\n\n\
             Example:\nlocal xPlayer = ESX.GetPlayerFromId(source)\n\
             if not xPlayer then return end\nlocal playerName = xPlayer.getName()\n\
             local playerMoney = xPlayer.getMoney()",
            "esx-docs",
            "esx",
            "function",
            "ESX.GetPlayerFromId",
            "player",
        ),
        doc(
            "exports['qb-target']:AddBoxZone(name, center, length, width, options, targetoptions)\n\n\
             Creates an interaction zone using qb-target.\n\n\
             Example:\nexports['qb-target']:AddBoxZone('shop_zone', \
             vector3(25.0, -1347.0, 29.5), 2.0, 2.0, {\n    heading = 0.0,\n    \
             debugPoly = false,\n}, {\n    options = { { type = 'client', \
             event = 'shop:client:open', label = 'Open Shop' } },\n    distance = 2.5\n})",
            "qb-target-docs",
            "qbcore",
            "export",
            "qb-target AddBoxZone",
            "interaction",
        ),
    ]
}

/// Reset the store and ingest the bundled sample corpus.
pub async fn initialize_knowledge_base(pipeline: &RagPipeline) -> Result<IngestSummary, RagError> {
    pipeline.clear().await?;

    let options = IngestOptions {
        chunk_size: 800,
        chunk_overlap: 100,
        batch_size: 5,
    };
    let summary = pipeline
        .ingest_documents(&sample_documents(), &options)
        .await?;

    tracing::info!(
        "knowledge base initialized: {} documents, {} chunks, {} failed",
        summary.processed_documents,
        summary.total_chunks,
        summary.failed_documents
    );
    Ok(summary)
}
