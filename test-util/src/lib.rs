use anyhow::Ok;
use near_workspaces::network::{NetworkClient, NetworkInfo, Sandbox};
use near_workspaces::result::ExecutionSuccess;
use near_workspaces::{types::Balance, AccountId, Contract, DevNetwork, Worker};

/// 1ms in nano seconds.
pub const MSECOND: u64 = 1_000_000;

pub async fn transfer_near(
    worker: &Worker<Sandbox>,
    account_id: &AccountId,
    deposit: Balance,
) -> anyhow::Result<ExecutionSuccess> {
    Ok(worker
        .root_account()?
        .transfer_near(account_id, deposit)
        .await?
        .into_result()?)
}

/// Build contract from sources and initialize it
pub async fn build_contract<T>(
    worker: &Worker<T>,
    project_path: &str,
    init_method: &str,
    args: near_sdk::serde_json::Value,
) -> anyhow::Result<Contract>
where
    T: NetworkInfo + NetworkClient + DevNetwork + Send + Sync,
{
    let mut wasm;
    let mut retry_count = 3;
    // Under some circumstances compilation could provide zero length built wasm. In this case we retry.
    loop {
        wasm = near_workspaces::compile_project(project_path).await?;
        if !wasm.is_empty() || retry_count == 0 {
            break;
        }
        retry_count -= 1;
    }

    let (id, sk) = worker.dev_generate().await;

    let contract = worker
        .create_tla_and_deploy(id, sk, &wasm)
        .await?
        .into_result()?;

    // initialize contract
    let _ = contract
        .call(init_method)
        .args_json(args)
        .max_gas()
        .transact()
        .await?
        .into_result()?;

    Ok(contract)
}

/// Get current block timestamp in milliseconds
pub async fn get_block_timestamp_ms<T>(worker: &Worker<T>) -> anyhow::Result<u64>
where
    T: NetworkClient + Send + Sync,
{
    Ok(worker.view_block().await?.timestamp() / MSECOND)
}

/// Fast forwards the sandbox until the block time reaches `ts_ms`.
pub async fn wait_until(worker: &Worker<Sandbox>, ts_ms: u64) -> anyhow::Result<()> {
    while get_block_timestamp_ms(worker).await? < ts_ms {
        worker.fast_forward(20).await?;
    }
    Ok(())
}
