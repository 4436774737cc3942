mod bot_test;
mod leaderboard_test;
mod profile_test;
mod router_test;
mod token_test;
