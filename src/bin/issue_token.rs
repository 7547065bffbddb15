use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let user_id = args.next().context("usage: courseflow-token <user-id> [expires-in-minutes]")?;
    let expires_in = args
        .next()
        .map(|raw| raw.parse::<i64>().with_context(|| format!("invalid minutes: {raw}")))
        .transpose()?;

    let token = courseflow::issue_token(&user_id, expires_in)?;
    println!("{token}");
    Ok(())
}
