use config::{Map, Source, Value};

#[derive(Clone, Debug)]
pub struct EnvironmentConfig {
	prefix: String,
	submatchers: &'static [&'static str],
	aliases: &'static [(&'static str, &'static str)],
	/// Read instead of the process environment
	vars: Option<Vec<(String, String)>>,
}

impl EnvironmentConfig {
	pub fn with_prefix(prefix: &str, submatchers: &'static [&'static str]) -> Self {
		Self {
			prefix: prefix.to_string(),
			submatchers,
			aliases: &[],
			vars: None,
		}
	}

	///
	/// Extra variable names mapped to a config key. The prefixed name wins when both are set
	///
	pub fn with_aliases(mut self, aliases: &'static [(&'static str, &'static str)]) -> Self {
		self.aliases = aliases;
		self
	}

	#[cfg(test)]
	pub fn with_vars(mut self, vars: Vec<(String, String)>) -> Self {
		self.vars = Some(vars);
		self
	}

	fn alias(&self, key: &str) -> Option<&'static str> {
		self.aliases
			.iter()
			.find(|(name, _)| name.eq_ignore_ascii_case(key))
			.map(|(_, config_key)| *config_key)
	}

	///
	/// Maps `PREFIX_PROVIDER_CLIENT_ID` to `provider.client_id`
	///
	fn transform_key(&self, key: &str) -> Option<String> {
		let key = key.to_lowercase();

		let prefix_pattern = format!("{}_", self.prefix).to_lowercase();
		if !key.starts_with(&prefix_pattern) {
			return None;
		}
		let rest = &key[prefix_pattern.len()..];
		for submatcher in self.submatchers {
			if rest == *submatcher {
				return Some(format!("{0}.{0}", submatcher));
			}
			let submatcher_prefix = format!("{}_", submatcher);
			if let Some(field) = rest.strip_prefix(&submatcher_prefix) {
				return Some(format!("{}.{}", submatcher, field));
			}
		}
		Some(rest.to_string())
	}

	fn collect_from<I>(&self, vars: I) -> Map<String, Value>
	where
		I: Iterator<Item = (String, String)>,
	{
		let mut m = Map::new();
		let mut aliased = Vec::new();
		let uri: String = "the environment".into();

		for (key, value) in vars {
			if value.is_empty() {
				continue;
			}
			if let Some(config_key) = self.alias(&key) {
				aliased.push((config_key.to_string(), value));
			} else if let Some(new_key) = self.transform_key(&key) {
				m.insert(new_key, Value::new(Some(&uri), value));
			}
		}
		for (key, value) in aliased {
			m.entry(key).or_insert_with(|| Value::new(Some(&uri), value));
		}
		m
	}
}

impl Source for EnvironmentConfig {
	fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
		Box::new((*self).clone())
	}

	fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
		match self.vars {
			Some(ref vars) => Ok(self.collect_from(vars.iter().cloned())),
			None => Ok(self.collect_from(std::env::vars())),
		}
	}
}
