// Reconnect within the grace window and forfeit after it

use std::time::Duration;

use crate::support::websocket::{eventually, fast_config, start_test_server};
use crate::support::websocket_client::WebSocketClient;

#[actix_web::test]
async fn rejoin_resumes_the_match() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_test_server(fast_config()).await?;
    let url = server.ws_url();
    let mut alice = WebSocketClient::connect_retry(&url, Duration::from_secs(1)).await?;
    let mut bob = WebSocketClient::connect_retry(&url, Duration::from_secs(1)).await?;
    alice.join("alice").await?;
    tokio::time::sleep(Duration::from_millis(30)).await;
    bob.join("bob").await?;
    let start = alice.expect_type("start").await?;
    bob.expect_type("start").await?;
    let game_id = start["gameId"].clone();

    alice.play(&game_id, 3, "R").await?;
    alice.expect_type("update").await?;
    bob.expect_type("update").await?;

    bob.close().await?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut bob_again = WebSocketClient::connect_retry(&url, Duration::from_secs(1)).await?;
    bob_again.join("bob").await?;
    let resume = bob_again.expect_type("resume").await?;
    assert_eq!(resume["gameId"], game_id);
    assert_eq!(resume["color"], "Y");
    assert_eq!(resume["currentPlayer"], "Y");
    assert_eq!(resume["opponent"], "alice");
    assert_eq!(resume["board"][5][3], "R");
    assert_eq!(resume["winCells"], serde_json::json!([]));

    // Past the first grace window the match is still on.
    tokio::time::sleep(Duration::from_millis(450)).await;
    bob_again.play(&game_id, 3, "Y").await?;
    let update = alice.expect_type("update").await?;
    assert_eq!(update["board"][4][3], "Y");

    alice.close().await?;
    bob_again.close().await?;
    server.stop().await;
    Ok(())
}

#[actix_web::test]
async fn staying_away_forfeits() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_test_server(fast_config()).await?;
    let url = server.ws_url();
    let mut alice = WebSocketClient::connect_retry(&url, Duration::from_secs(1)).await?;
    let mut bob = WebSocketClient::connect_retry(&url, Duration::from_secs(1)).await?;
    alice.join("alice").await?;
    tokio::time::sleep(Duration::from_millis(30)).await;
    bob.join("bob").await?;
    alice.expect_type("start").await?;
    bob.expect_type("start").await?;

    bob.close().await?;
    let forfeit = alice.expect_type("forfeit").await?;
    assert_eq!(forfeit["winner"], "alice");

    let leaderboard = server.leaderboard.clone();
    eventually(Duration::from_secs(2), || leaderboard.completed_games().len() == 1).await?;
    assert_eq!(leaderboard.wins_for("alice"), 0);

    alice.close().await?;
    server.stop().await;
    Ok(())
}
