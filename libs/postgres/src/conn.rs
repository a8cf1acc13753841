use std::str::FromStr;

use tokio_postgres::Config;

use dbapi_api::ExecutorError;

/// Parse a connection string into a driver config.
///
/// Accepts a libpq DSN / URL (`host=db user=app`, `postgres://app@db/crm`)
/// or the short form `user@http://host:port/database/password`, where the
/// port is exactly four digits.
pub fn parse_conn_str(conn: &str) -> Result<Config, ExecutorError> {
    let conn = conn.trim();
    if conn.is_empty() {
        return Err(ExecutorError::config("empty Postgres connection string"));
    }
    if conn.contains("@http://") {
        return parse_short_form(conn);
    }
    Config::from_str(conn).map_err(|e| ExecutorError::config(format!("invalid Postgres DSN: {e}")))
}

fn parse_short_form(conn: &str) -> Result<Config, ExecutorError> {
    let invalid = || {
        ExecutorError::config("invalid connection string, expected user@http://host:port/database/password")
    };

    let (user, rest) = conn.split_once("@http://").ok_or_else(invalid)?;
    if user.is_empty() || user.contains('/') {
        return Err(invalid());
    }

    let mut parts = rest.split('/');
    let (Some(address), Some(database), Some(password), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    let (host, port) = address.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() || database.is_empty() || password.is_empty() {
        return Err(invalid());
    }
    if port.len() != 4 || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let port: u16 = port.parse().map_err(|_| invalid())?;

    let mut config = Config::new();
    config
        .user(user)
        .password(password)
        .host(host)
        .port(port)
        .dbname(database);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbapi_api::ErrorKind;
    use tokio_postgres::config::Host;

    #[test]
    fn short_form() {
        let config = parse_conn_str("db_user@http://db.server.com:6432/db011/my_secret").unwrap();
        assert_eq!(config.get_user(), Some("db_user"));
        assert_eq!(config.get_password(), Some(&b"my_secret"[..]));
        assert_eq!(config.get_hosts(), &[Host::Tcp("db.server.com".into())]);
        assert_eq!(config.get_ports(), &[6432]);
        assert_eq!(config.get_dbname(), Some("db011"));
    }

    #[test]
    fn short_form_rejects_malformed_input() {
        for conn in [
            "@http://h:5432/db/pw",
            "u@http://h:54321/db/pw",
            "u@http://h:port/db/pw",
            "u@http://h:5432/db",
            "u@http://h:5432/db/pw/extra",
            "u@http://:5432/db/pw",
        ] {
            let err = parse_conn_str(conn).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config, "{conn}");
        }
    }

    #[test]
    fn libpq_forms() {
        let config = parse_conn_str("host=localhost user=app dbname=crm").unwrap();
        assert_eq!(config.get_user(), Some("app"));
        assert_eq!(config.get_dbname(), Some("crm"));

        let config = parse_conn_str("postgres://app:pw@localhost:5433/crm").unwrap();
        assert_eq!(config.get_ports(), &[5433]);
    }

    #[test]
    fn empty_is_config_error() {
        assert_eq!(parse_conn_str("  ").unwrap_err().kind(), ErrorKind::Config);
    }
}
