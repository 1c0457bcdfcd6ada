use anyhow::Ok;
use distribute::{Category, Outcome, COMMIT_DEPOSIT, REGISTER_DEPOSIT};
use near_sdk::serde_json::{json, Value};
use near_units::parse_near;
use near_workspaces::{network::Sandbox, Account, Contract, Worker};
use test_util::{build_contract, get_block_timestamp_ms, transfer_near, wait_until};

/// Commit and reveal window of both tracks, in milliseconds.
const WINDOW: u64 = 30_000;
const SALT: &str = "7777";

async fn init(worker: &Worker<Sandbox>) -> anyhow::Result<(Contract, Account, Account, Account)> {
    let authority = worker.dev_create_account().await?;
    let alice = worker.dev_create_account().await?;
    let bob = worker.dev_create_account().await?;

    let contract = build_contract(worker, "./", "new", json!({"authority": authority.id()})).await?;
    transfer_near(worker, contract.id(), parse_near!("10 N")).await?;

    let res = authority
        .call(contract.id(), "update_settings")
        .args_json(json!({"settings_json": {
            "tokenCommitWindow": WINDOW, "tokenRevealWindow": WINDOW,
            "reputationCommitWindow": WINDOW, "reputationRevealWindow": WINDOW,
        }}))
        .max_gas()
        .transact()
        .await?;
    assert!(res.is_success(), "{:?}", res.receipt_failures());

    for voter in [&alice, &bob] {
        let res = authority
            .call(contract.id(), "mint_tokens")
            .args_json(json!({"account": voter.id(), "amount": "1000"}))
            .max_gas()
            .transact()
            .await?;
        assert!(res.is_success(), "{:?}", res.receipt_failures());
        let res = voter
            .call(contract.id(), "register")
            .deposit(REGISTER_DEPOSIT)
            .max_gas()
            .transact()
            .await?;
        assert!(res.is_success(), "{:?}", res.receipt_failures());
    }

    Ok((contract, authority, alice, bob))
}

async fn commit(
    contract: &Contract,
    voter: &Account,
    task_id: u64,
    track: &str,
    vote: &str,
    stake: &str,
) -> anyhow::Result<()> {
    let hash: Value = contract
        .view("commit_hash")
        .args_json(json!({"vote": vote, "salt": SALT}))
        .await?
        .json()?;
    let res = voter
        .call(contract.id(), "commit_task_vote")
        .args_json(json!({"task_id": task_id, "axis": "validate_yes", "track": track,
            "commit_hash": hash, "stake": stake}))
        .deposit(COMMIT_DEPOSIT)
        .max_gas()
        .transact()
        .await?;
    assert!(res.is_success(), "{:?}", res.receipt_failures());
    Ok(())
}

async fn reveal(
    contract: &Contract,
    voter: &Account,
    task_id: u64,
    track: &str,
    vote: &str,
) -> anyhow::Result<()> {
    let res = voter
        .call(contract.id(), "reveal_task_vote")
        .args_json(json!({"task_id": task_id, "axis": "validate_yes", "track": track,
            "vote": vote, "salt": SALT}))
        .max_gas()
        .transact()
        .await?;
    assert!(res.is_success(), "{:?}", res.receipt_failures());
    Ok(())
}

#[ignore = "requires the sandbox node and a wasm build"]
#[tokio::test]
async fn contested_task_flow() -> anyhow::Result<()> {
    // 1. register a project with a unanimous and a contested task
    // 2. route both, only the contested one opens polls
    // 3. commit and reveal on both tracks, settle, check balances and the task outcome
    let worker = near_workspaces::sandbox().await?;
    let (contract, authority, alice, bob) = init(&worker).await?;

    let project: u64 = authority
        .call(contract.id(), "add_project")
        .args_json(json!({"tasks": ["unanimous", "contested"]}))
        .max_gas()
        .transact()
        .await?
        .json()?;
    let attestations = [(1, "100", "0"), (2, "100", "40")];
    for (task_id, yes, no) in attestations {
        let res = authority
            .call(contract.id(), "record_attestation")
            .args_json(json!({"task_id": task_id, "yes": yes, "no": no}))
            .max_gas()
            .transact()
            .await?;
        assert!(res.is_success(), "{:?}", res.receipt_failures());
    }
    let categories = [(1, Category::TrueOnly), (2, Category::TrueMore)];
    for (task_id, expected) in categories {
        let category: Category = authority
            .call(contract.id(), "route_task")
            .args_json(json!({ "task_id": task_id }))
            .max_gas()
            .transact()
            .await?
            .json()?;
        assert_eq!(category, expected);
    }
    let start = get_block_timestamp_ms(&worker).await?;

    // unanimous task never gets a poll
    let res = alice
        .call(contract.id(), "commit_task_vote")
        .args_json(json!({"task_id": 1, "axis": "validate_yes", "track": "token",
            "commit_hash": "AAAA", "stake": "10"}))
        .deposit(COMMIT_DEPOSIT)
        .max_gas()
        .transact()
        .await?;
    assert!(res.is_failure());

    commit(&contract, &alice, 2, "token", "yes", "100").await?;
    commit(&contract, &bob, 2, "token", "no", "50").await?;
    commit(&contract, &alice, 2, "reputation", "yes", "300").await?;

    wait_until(&worker, start + WINDOW).await?;
    reveal(&contract, &alice, 2, "token", "yes").await?;
    reveal(&contract, &bob, 2, "token", "no").await?;
    reveal(&contract, &alice, 2, "reputation", "yes").await?;

    wait_until(&worker, start + 2 * WINDOW).await?;
    for poll_id in [1u64, 2] {
        let res = bob
            .call(contract.id(), "settle")
            .args_json(json!({ "poll_id": poll_id }))
            .max_gas()
            .transact()
            .await?;
        assert!(res.is_success(), "{:?}", res.receipt_failures());
    }

    let outcome: Outcome = contract
        .view("project_outcome")
        .args_json(json!({ "project_id": project }))
        .await?
        .json()?;
    assert_eq!(outcome, Outcome::Passed);

    let alice_tokens: Value = contract
        .view("balance")
        .args_json(json!({"track": "token", "account": alice.id()}))
        .await?
        .json()?;
    assert_eq!(alice_tokens["available"], "1050");
    let bob_tokens: Value = contract
        .view("balance")
        .args_json(json!({"track": "token", "account": bob.id()}))
        .await?
        .json()?;
    assert_eq!(bob_tokens["available"], "950");
    assert_eq!(bob_tokens["locked"], "0");

    Ok(())
}
