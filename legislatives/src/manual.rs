/*!

This is the long-form manual for `legislatives` and `legiscrape`.

## Sources

The results of the first round of the French legislative elections are
published on data.gouv.fr as Excel workbooks, one row per district
(circonscription). Only the first worksheet is read, its first row being
the header.

### 2024

Each row holds 18 district columns followed by one group of 9 columns per
candidate slot. The group columns carry the slot number as a suffix:

| Code département | ... | % Nuls/votants | Numéro de panneau 1 | Nuance candidat 1 | ... | Elu 1 | Numéro de panneau 2 | ... |
|------------------|-----|----------------|---------------------|-------------------|-----|-------|---------------------|-----|

Percentages are text with a decimal comma (`45,3%`).

### 2022

The same information, with different labels (`% Vot/Ins`, `N°Panneau`,
`Sièges`, ...), two extra columns (`Etat saisie`, `Code de la
circonscription`) and candidate groups that are not numbered: the 9 labels
simply repeat 22 times, in the order `N°Panneau, Sexe, Nom, Prénom, Nuance,
Voix, % Voix/Ins, % Voix/Exp, Sièges`. The export stops one column short of
the last group.

The 2022 district codes do not follow the 2024 codes. Districts are matched
on the pair (department label, district label) after replacing `è` with `e`
in the district labels; 2022 districts without a 2024 counterpart are left
out.

## Output tables

| table | key | content |
|-------|-----|---------|
| `CircoTable` | department code, district code | labels of the district |
| `CircoData` | district code, year | registered voters, turnout, abstentions, valid, blank and null ballots |
| `CircoCandidateData` | district code, candidate number, year | panel, nuance, name, gender (`M`/`F`), votes, elected |

The candidate number is the position of the candidate in the source row.
It does not identify a person across elections.

Column names are the French labels with accents removed, spaces and slashes
replaced by `_` and `%` spelled `Percent` (`% Exprimés/inscrits` becomes
`Percent_Exprimes_inscrits`).

## Running

```bash
legiscrape --database legislatives.sqlite
```

downloads both workbooks, assembles the tables and writes them to the
SQLite database. Use `--dry-run` to only print the number of rows of each
table, and `--input-2024` / `--input-2022` to read workbooks already
downloaded.

## Configuration

All the settings can also be given in a JSON file passed with `--config`.
Every key is optional; command line flags take precedence.

```json
{
  "sources": {
    "url2024": "https://www.data.gouv.fr/fr/datasets/r/27345cbc-7e49-4050-8cfc-be3ad1865890",
    "url2022": "https://www.data.gouv.fr/fr/datasets/r/33705a8a-7024-4311-a3f9-988063b0e10e",
    "path2024": null,
    "path2022": null
  },
  "database": { "path": "legislatives.sqlite", "replaceTables": true },
  "batchSize": 1000,
  "fetchTimeoutSecs": 120,
  "swapCandidateYearTags": false
}
```

- `replaceTables`: drop the destination tables before loading them, so that
  each run is a full reload.
- `swapCandidateYearTags`: tag the 2024 candidate rows with 2022 and the 2022
  candidate rows with 2024, as the first published version of these tables
  did. District rows are always tagged with their own year.

 */
